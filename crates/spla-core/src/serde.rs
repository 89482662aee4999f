use std::collections::BTreeMap;

use serde::ser::SerializeStruct;
use serde::Deserialize;

use crate::{SparseMatrix, SparseVector};

impl serde::Serialize for SparseVector {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let entries: BTreeMap<usize, f64> = self.iter().collect();
        let mut state = serializer.serialize_struct("SparseVector", 3)?;
        state.serialize_field("keys", self.keys())?;
        state.serialize_field("default_value", &self.default_value())?;
        state.serialize_field("entries", &entries)?;
        state.end()
    }
}

impl<'de> serde::Deserialize<'de> for SparseVector {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct VectorData {
            keys: Vec<usize>,
            #[serde(default)]
            default_value: f64,
            #[serde(default)]
            entries: BTreeMap<usize, f64>,
        }

        let VectorData {
            keys,
            default_value,
            entries,
        } = VectorData::deserialize(deserializer)?;

        let mut vector = SparseVector::from_keys(&keys, default_value);
        for (k, v) in entries {
            vector.set(k, v).map_err(serde::de::Error::custom)?;
        }
        Ok(vector)
    }
}

impl serde::Serialize for SparseMatrix {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let rows: BTreeMap<usize, BTreeMap<usize, f64>> = self
            .non_empty_rows()
            .map(|(r, row)| (r, row.iter().collect()))
            .collect();
        let mut state = serializer.serialize_struct("SparseMatrix", 4)?;
        state.serialize_field("row_keys", self.row_keys())?;
        state.serialize_field("col_keys", self.col_keys())?;
        state.serialize_field("default_value", &self.default_value())?;
        state.serialize_field("rows", &rows)?;
        state.end()
    }
}

impl<'de> serde::Deserialize<'de> for SparseMatrix {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct MatrixData {
            row_keys: Vec<usize>,
            col_keys: Vec<usize>,
            #[serde(default)]
            default_value: f64,
            #[serde(default)]
            rows: BTreeMap<usize, BTreeMap<usize, f64>>,
        }

        let MatrixData {
            row_keys,
            col_keys,
            default_value,
            rows,
        } = MatrixData::deserialize(deserializer)?;

        let mut matrix = SparseMatrix::from_keys(&row_keys, &col_keys, default_value);
        for (r, row) in rows {
            for (c, v) in row {
                matrix.set(r, c, v).map_err(serde::de::Error::custom)?;
            }
        }
        Ok(matrix)
    }
}
