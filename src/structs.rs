use serde_derive::Serialize;

use crate::mining::{Signature, Substring};
use crate::node::Occurrence;
use crate::sequences::SequenceId;

#[derive(Serialize, Clone, Debug)]
pub struct SequenceRecord {
    pub id:     SequenceId,
    pub name:   String,
    pub file:   String,
    pub class:  usize,
    pub length: usize,
}

#[derive(Serialize, Clone, Debug, Default)]
pub struct RunSettings {
    pub min_length:    usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern:       Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_support:   Option<usize>,
    pub closed:        bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_instances: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high_level:    Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low_level:     Option<f64>,
    pub pruned:        bool,
}

#[derive(Serialize, Clone, Debug)]
pub struct OccurrenceRecord {
    pub sequence: SequenceId,
    pub name:     String,
    pub start:    usize,
}

#[derive(Serialize, Clone, Debug)]
pub struct SubstringRecord {
    pub text:       String,
    pub length:     usize,
    pub support:    usize,
    pub embeddings: usize,
}

impl From<&Substring> for SubstringRecord {
    fn from(s: &Substring) -> Self {
        SubstringRecord {
            text:       String::from_utf8_lossy(&s.text).into_owned(),
            length:     s.text.len(),
            support:    s.support,
            embeddings: s.embeddings,
        }
    }
}

#[derive(Serialize, Clone, Debug)]
pub struct SignatureRecord {
    pub text:           String,
    pub length:         usize,
    pub class:          usize,
    pub class_name:     String,
    pub score:          f64,
    pub rate:           f64,
    pub runner_up_rate: f64,
}

/// Everything a run produces, as written by the exporters.
#[derive(Serialize, Debug, Default)]
pub struct Report {
    pub classes:     Vec<String>,
    pub sequences:   Vec<SequenceRecord>,
    pub settings:    RunSettings,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub occurrences: Vec<OccurrenceRecord>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub substrings:  Vec<SubstringRecord>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub signatures:  Vec<SignatureRecord>,
}

impl Report {
    pub fn new(classes: Vec<String>, sequences: Vec<SequenceRecord>, settings: RunSettings) -> Report {
        Report {
            classes,
            sequences,
            settings,
            ..Default::default()
        }
    }

    pub fn find_sequence(&self, id: SequenceId) -> Option<&SequenceRecord> {
        self.sequences.iter().find(|s| s.id == id)
    }

    pub fn add_occurrences<I: IntoIterator<Item = Occurrence>>(&mut self, occurrences: I) {
        for o in occurrences {
            let name = self
                .find_sequence(o.sequence)
                .map(|s| s.name.clone())
                .unwrap_or_default();
            self.occurrences.push(OccurrenceRecord {
                sequence: o.sequence,
                name,
                start: o.start,
            });
        }
    }

    pub fn add_substrings(&mut self, substrings: &[Substring]) {
        let min_length = self.settings.min_length;
        self.substrings.extend(
            substrings
                .iter()
                .filter(|s| s.text.len() >= min_length)
                .map(SubstringRecord::from),
        );
    }

    pub fn add_signatures(&mut self, signatures: &[Signature]) {
        let min_length = self.settings.min_length;
        for s in signatures.iter().filter(|s| s.text.len() >= min_length) {
            self.signatures.push(SignatureRecord {
                text:           String::from_utf8_lossy(&s.text).into_owned(),
                length:         s.text.len(),
                class:          s.class,
                class_name:     self.classes.get(s.class).cloned().unwrap_or_default(),
                score:          s.score,
                rate:           s.rate,
                runner_up_rate: s.runner_up_rate,
            });
        }
    }
}
