/// The five fixed columns of a component record, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Code,
    Name,
    Model,
    Package,
    Brand,
}

impl Column {
    pub const ALL: [Column; 5] = [
        Column::Code,
        Column::Name,
        Column::Model,
        Column::Package,
        Column::Brand,
    ];

    pub fn from_index(idx: usize) -> Option<Column> {
        Self::ALL.get(idx).copied()
    }

    pub fn index(self) -> usize {
        match self {
            Column::Code => 0,
            Column::Name => 1,
            Column::Model => 2,
            Column::Package => 3,
            Column::Brand => 4,
        }
    }

    /// Header name used by the source spreadsheet.
    pub fn source_header(self) -> &'static str {
        match self {
            Column::Code => "元器件编号",
            Column::Name => "元器件名称",
            Column::Model => "元器件型号",
            Column::Package => "元器件封装",
            Column::Brand => "品牌",
        }
    }

    /// Label shown in the table header.
    pub fn label(self) -> &'static str {
        match self {
            Column::Code => "编号",
            Column::Name => "名称",
            Column::Model => "型号",
            Column::Package => "封装",
            Column::Brand => "品牌",
        }
    }
}

/// One component entry. All fields are always present, possibly empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    pub code: String,
    pub name: String,
    pub model: String,
    pub package: String,
    pub brand: String,
}

impl Record {
    #[cfg(test)]
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        model: impl Into<String>,
        package: impl Into<String>,
        brand: impl Into<String>,
    ) -> Self {
        Record {
            code: code.into(),
            name: name.into(),
            model: model.into(),
            package: package.into(),
            brand: brand.into(),
        }
    }

    pub fn field(&self, column: Column) -> &str {
        match column {
            Column::Code => &self.code,
            Column::Name => &self.name,
            Column::Model => &self.model,
            Column::Package => &self.package,
            Column::Brand => &self.brand,
        }
    }

    pub fn field_mut(&mut self, column: Column) -> &mut String {
        match column {
            Column::Code => &mut self.code,
            Column::Name => &mut self.name,
            Column::Model => &mut self.model,
            Column::Package => &mut self.package,
            Column::Brand => &mut self.brand,
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        Column::ALL.iter().map(move |&c| self.field(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_lookup_matches_order() {
        for (idx, column) in Column::ALL.iter().enumerate() {
            assert_eq!(column.index(), idx);
            assert_eq!(Column::from_index(idx), Some(*column));
        }
        assert_eq!(Column::from_index(5), None);
    }

    #[test]
    fn field_access_by_column() {
        let mut record = Record::new("C1", "Resistor", "0402WGF1002TCE", "0402", "UNI-ROYAL");
        assert_eq!(record.field(Column::Package), "0402");
        *record.field_mut(Column::Brand) = "YAGEO".into();
        assert_eq!(
            record.fields().collect::<Vec<_>>(),
            vec!["C1", "Resistor", "0402WGF1002TCE", "0402", "YAGEO"]
        );
    }

    #[test]
    fn default_record_has_empty_fields() {
        let record = Record::default();
        assert!(record.fields().all(str::is_empty));
    }
}
