use serde_derive::Serialize;

use crate::errors::*;
use crate::sequences::SequenceId;

/// Partition of the sequence ids into consecutive classes: the first `populations[0]`
/// sequences form class 0, the next `populations[1]` class 1, and so on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassTable {
    populations: Vec<usize>,
}

impl ClassTable {
    pub fn new(populations: Vec<usize>) -> Result<Self> {
        if populations.is_empty() {
            return Err(Error::EmptyClassTable);
        }
        if let Some(i) = populations.iter().position(|&p| p == 0) {
            return Err(Error::EmptyClass(i));
        }
        Ok(ClassTable { populations })
    }

    pub fn len(&self) -> usize {
        self.populations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.populations.is_empty()
    }

    pub fn population(&self, class: usize) -> usize {
        self.populations[class]
    }

    pub fn populations(&self) -> &[usize] {
        &self.populations
    }

    /// Number of sequences covered by the table.
    pub fn total(&self) -> usize {
        self.populations.iter().sum()
    }

    pub fn class_of(&self, sequence: SequenceId) -> Result<usize> {
        let unclassified = || Error::UnclassifiedSequence {
            sequence,
            total: self.total(),
        };
        if sequence == 0 {
            return Err(unclassified());
        }

        let mut rank = sequence as usize;
        for (class, &population) in self.populations.iter().enumerate() {
            if rank <= population {
                return Ok(class);
            }
            rank -= population;
        }
        Err(unclassified())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consecutive_classes() {
        let classes = ClassTable::new(vec![2, 1, 3]).unwrap();
        let found: Vec<usize> = (1..=6).map(|s| classes.class_of(s).unwrap()).collect();
        assert_eq!(found, vec![0, 0, 1, 2, 2, 2]);
        assert_eq!(classes.total(), 6);
        assert_eq!(classes.len(), 3);
    }

    #[test]
    fn out_of_range() {
        let classes = ClassTable::new(vec![2, 2]).unwrap();
        assert!(matches!(
            classes.class_of(5),
            Err(Error::UnclassifiedSequence { sequence: 5, total: 4 })
        ));
        assert!(classes.class_of(0).is_err());
    }

    #[test]
    fn malformed_tables() {
        assert!(matches!(ClassTable::new(vec![]), Err(Error::EmptyClassTable)));
        assert!(matches!(ClassTable::new(vec![3, 0, 1]), Err(Error::EmptyClass(1))));
    }
}
