use super::ResultSet;

/// Ordered tables produced by one fill of a command.
///
/// A statement that yields no result columns (plain DML, DDL) produces zero tables.
#[derive(Debug, Clone, Default)]
pub struct DataSet {
    pub tables: Vec<ResultSet>,
}

impl DataSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, table: ResultSet) {
        self.tables.push(table);
    }

    #[must_use]
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    #[must_use]
    pub fn first_table(&self) -> Option<&ResultSet> {
        self.tables.first()
    }

    pub fn into_first_table(self) -> Option<ResultSet> {
        self.tables.into_iter().next()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::types::RowValues;

    #[test]
    fn rows_share_column_lookup() {
        let mut table = ResultSet::with_capacity(2);
        table.set_column_names(Arc::new(vec!["Id".into(), "Name".into()]));
        table.add_row_values(vec![RowValues::Int(1), RowValues::Text("a".into())]);
        table.add_row_values(vec![RowValues::Int(2), RowValues::Text("b".into())]);

        let mut set = DataSet::new();
        set.push(table);

        let first = set.first_table().and_then(ResultSet::first_row).unwrap();
        assert_eq!(first.get("Name"), Some(&RowValues::Text("a".into())));
        assert_eq!(first.get("name"), Some(&RowValues::Text("a".into())));
        assert_eq!(set.tables[0].rows_affected, 2);
    }

    #[test]
    fn rows_without_columns_are_dropped() {
        let mut table = ResultSet::default();
        table.add_row_values(vec![RowValues::Int(1)]);
        assert!(table.is_empty());
        assert!(DataSet::new().into_first_table().is_none());
    }
}
