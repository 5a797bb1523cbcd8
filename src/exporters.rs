use std::io::Write;

use anyhow::{Context, Result};

use crate::structs::*;

pub trait Exporter {
    fn save(&self, report: &Report, out: &mut dyn Write) -> Result<()>;
}

pub struct JSONExporter;
impl Exporter for JSONExporter {
    fn save(&self, report: &Report, out: &mut dyn Write) -> Result<()> {
        writeln!(
            out,
            "{}",
            serde_json::to_string_pretty(report).context("Unable to serialize result into JSON")?
        )
        .context("Unable to write results")
    }
}

/// One tab-separated table per non-empty section of the report.
pub struct TSVExporter;
impl Exporter for TSVExporter {
    fn save(&self, report: &Report, out: &mut dyn Write) -> Result<()> {
        if !report.occurrences.is_empty() {
            writeln!(out, "#record\tsequence_id\tstart").context("Unable to write results")?;
            for o in &report.occurrences {
                writeln!(out, "{}\t{}\t{}", o.name, o.sequence, o.start).context("Unable to write results")?;
            }
        }

        if !report.substrings.is_empty() {
            writeln!(out, "#substring\tlength\tsupport\tembeddings").context("Unable to write results")?;
            for s in &report.substrings {
                writeln!(
                    out,
                    "{text}\t{length}\t{support}\t{embeddings}",
                    text       = s.text,
                    length     = s.length,
                    support    = s.support,
                    embeddings = s.embeddings,
                )
                .context("Unable to write results")?;
            }
        }

        if !report.signatures.is_empty() {
            writeln!(out, "#substring\tlength\tclass\tscore\trate\trunner_up_rate").context("Unable to write results")?;
            for s in &report.signatures {
                writeln!(
                    out,
                    "{text}\t{length}\t{class}\t{score}\t{rate:.4}\t{runner_up:.4}",
                    text      = s.text,
                    length    = s.length,
                    class     = s.class_name,
                    score     = s.score,
                    rate      = s.rate,
                    runner_up = s.runner_up_rate,
                )
                .context("Unable to write results")?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Report {
        let mut report = Report::new(vec!["a.fa".into()], vec![], RunSettings::default());
        report.substrings.push(SubstringRecord {
            text:       "acg".into(),
            length:     3,
            support:    2,
            embeddings: 5,
        });
        report
    }

    #[test]
    fn tsv_sections() {
        let mut out = Vec::new();
        TSVExporter.save(&sample(), &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert_eq!(out, "#substring\tlength\tsupport\tembeddings\nacg\t3\t2\t5\n");
    }

    #[test]
    fn json_skips_empty_sections() {
        let mut out = Vec::new();
        JSONExporter.save(&sample(), &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["substrings"][0]["support"], 2);
        assert!(value.get("signatures").is_none());
        assert!(value.get("occurrences").is_none());
        assert_eq!(value["classes"][0], "a.fa");
    }
}
