/// Read query against one table of the record store: equality filters,
/// one sort field, offset pagination. Serialized into the store API's
/// `filter=field:value` / `sort=-field` query-parameter convention.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    filters: Vec<(String, String)>,
    sort: Option<(String, SortDirection)>,
    limit: Option<u32>,
    offset: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, field: &str, value: impl ToString) -> Self {
        self.filters.push((field.to_string(), value.to_string()));
        self
    }

    pub fn sort_asc(mut self, field: &str) -> Self {
        self.sort = Some((field.to_string(), SortDirection::Ascending));
        self
    }

    pub fn sort_desc(mut self, field: &str) -> Self {
        self.sort = Some((field.to_string(), SortDirection::Descending));
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Query parameters in the store API's wire convention.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        for (field, value) in &self.filters {
            params.push(("filter".to_string(), format!("{field}:{value}")));
        }
        if let Some((field, direction)) = &self.sort {
            let spelled = match direction {
                SortDirection::Ascending => field.clone(),
                SortDirection::Descending => format!("-{field}"),
            };
            params.push(("sort".to_string(), spelled));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(offset) = self.offset {
            params.push(("offset".to_string(), offset.to_string()));
        }
        params
    }

    /// Deterministic cache key for this query against `table`.
    pub fn cache_key(&self, table: &str) -> String {
        let mut key = format!("list:{table}");
        for (name, value) in self.to_params() {
            key.push_str(&format!(":{name}={value}"));
        }
        key
    }

    /// Equality filters in insertion order. The in-memory store consults
    /// these directly to mirror the hosted API's filter semantics.
    pub fn filters(&self) -> &[(String, String)] {
        &self.filters
    }

    pub fn sort_spec(&self) -> Option<(&str, SortDirection)> {
        self.sort
            .as_ref()
            .map(|(field, direction)| (field.as_str(), *direction))
    }

    pub fn page(&self) -> (Option<u32>, Option<u32>) {
        (self.limit, self.offset)
    }
}
