use crate::parser::generator_parser::GeneratorType;
use crate::parser::sf2_types::{GeneratorAmount, GeneratorRecord, Range, RawGenerator};
use serde::Serialize;
use std::collections::BTreeMap;

/// Generators of a zone merged by type.
///
/// Starts from a full `keyRange`, later records of the same type replace earlier ones and
/// unassigned codes pile up in `unknown` in file order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZoneParameters {
    values: BTreeMap<GeneratorType, GeneratorAmount>,
    unknown: Vec<RawGenerator>,
}

impl Default for ZoneParameters {
    fn default() -> Self {
        let mut values = BTreeMap::new();
        values.insert(GeneratorType::KeyRange, GeneratorAmount::Range(Range::FULL));
        Self {
            values,
            unknown: Vec::new(),
        }
    }
}

impl ZoneParameters {
    pub fn apply(&mut self, record: &GeneratorRecord) {
        match record {
            GeneratorRecord::Known {
                generator_type,
                value,
            } => {
                self.values.insert(*generator_type, *value);
            }
            GeneratorRecord::Unknown(raw) => self.unknown.push(*raw),
        }
    }

    pub fn get(&self, generator_type: GeneratorType) -> Option<GeneratorAmount> {
        self.values.get(&generator_type).copied()
    }

    pub fn contains(&self, generator_type: GeneratorType) -> bool {
        self.values.contains_key(&generator_type)
    }

    /// Scalar amount, `None` if absent or range shaped
    pub fn amount(&self, generator_type: GeneratorType) -> Option<i16> {
        self.get(generator_type).and_then(|value| value.amount())
    }

    /// Range amount, `None` if absent or scalar
    pub fn range(&self, generator_type: GeneratorType) -> Option<Range> {
        self.get(generator_type).and_then(|value| value.range())
    }

    pub fn key_range(&self) -> Range {
        self.range(GeneratorType::KeyRange).unwrap_or(Range::FULL)
    }

    pub fn vel_range(&self) -> Range {
        self.range(GeneratorType::VelRange).unwrap_or(Range::FULL)
    }

    pub fn unknown(&self) -> &[RawGenerator] {
        &self.unknown
    }

    pub fn iter(&self) -> impl Iterator<Item = (GeneratorType, GeneratorAmount)> + '_ {
        self.values.iter().map(|(k, v)| (*k, *v))
    }

    /// Number of known generators, the default `keyRange` included
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Holds nothing but the default `keyRange`
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl<'a> FromIterator<&'a GeneratorRecord> for ZoneParameters {
    fn from_iter<T: IntoIterator<Item = &'a GeneratorRecord>>(iter: T) -> Self {
        iter.into_iter().fold(Self::default(), |mut params, record| {
            params.apply(record);
            params
        })
    }
}
