//! Query options for record and collection listing routes.

use urlencoding::encode;

/// Options for routes returning a single record.
#[derive(Debug, Default, Clone)]
pub struct ViewOptions {
    /// Comma separated fields to return (all fields when unset).
    pub fields: Option<String>,
    /// Relations to auto-expand.
    pub expand: Option<String>,
    /// Sort attribute(s).
    pub sort: Option<String>,
}

/// Query parameters for the paginated list routes.
#[derive(Debug, Default, Clone)]
pub struct ListOptions {
    /// Page number, starting at 1.
    pub page: Option<u64>,
    /// Number of items per page.
    pub per_page: Option<u64>,
    /// Skip the (potentially expensive) total-items count.
    pub skip_total: Option<bool>,
    /// Record filter expression.
    pub filter: Option<String>,
    /// Comma separated fields to return (all fields when unset).
    pub fields: Option<String>,
    /// Relations to auto-expand.
    pub expand: Option<String>,
    /// Sort attribute(s).
    pub sort: Option<String>,
}

impl ListOptions {
    /// Options that only set the page number and page size.
    #[must_use]
    pub fn paginated(page: u64, per_page: u64) -> Self {
        Self {
            page: Some(page),
            per_page: Some(per_page),
            ..Self::default()
        }
    }

    /// Like [`paginated`](Self::paginated), but also skips the total count.
    #[must_use]
    pub fn paginated_and_skip(page: u64, per_page: u64) -> Self {
        Self {
            page: Some(page),
            per_page: Some(per_page),
            skip_total: Some(true),
            ..Self::default()
        }
    }

    /// Options selecting the first record matching `filter`.
    #[must_use]
    pub fn first_match(filter: impl Into<String>) -> Self {
        Self {
            page: Some(1),
            per_page: Some(1),
            skip_total: Some(true),
            filter: Some(filter.into()),
            ..Self::default()
        }
    }

    /// Renders the options as a `?key=value&...` query string.
    ///
    /// Returns an empty string when no option is set. Key order is fixed so
    /// rendered URLs are deterministic.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        let mut pairs: Vec<String> = Vec::new();
        if let Some(page) = self.page {
            pairs.push(format!("page={page}"));
        }
        if let Some(per_page) = self.per_page {
            pairs.push(format!("perPage={per_page}"));
        }
        if let Some(skip_total) = self.skip_total {
            pairs.push(format!("skipTotal={}", u8::from(skip_total)));
        }
        if let Some(filter) = &self.filter {
            pairs.push(format!("filter={}", encode(filter)));
        }
        if let Some(fields) = &self.fields {
            pairs.push(format!("fields={}", encode(fields)));
        }
        if let Some(expand) = &self.expand {
            pairs.push(format!("expand={}", encode(expand)));
        }
        if let Some(sort) = &self.sort {
            pairs.push(format!("sort={}", encode(sort)));
        }
        render_query(pairs)
    }
}

impl ViewOptions {
    /// Renders the options as a `?key=value&...` query string.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        let mut pairs: Vec<String> = Vec::new();
        if let Some(fields) = &self.fields {
            pairs.push(format!("fields={}", encode(fields)));
        }
        if let Some(expand) = &self.expand {
            pairs.push(format!("expand={}", encode(expand)));
        }
        if let Some(sort) = &self.sort {
            pairs.push(format!("sort={}", encode(sort)));
        }
        render_query(pairs)
    }
}

fn render_query(pairs: Vec<String>) -> String {
    if pairs.is_empty() {
        String::new()
    } else {
        format!("?{}", pairs.join("&"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_list_options_empty_renders_empty_string() {
        assert_eq!(ListOptions::default().to_query_string(), "");
    }

    #[test]
    fn test_list_options_paginated() {
        let options = ListOptions::paginated(2, 50);
        assert_eq!(options.to_query_string(), "?page=2&perPage=50");
    }

    #[test]
    fn test_list_options_paginated_and_skip() {
        let options = ListOptions::paginated_and_skip(1, 200);
        assert_eq!(options.to_query_string(), "?page=1&perPage=200&skipTotal=1");
    }

    #[test]
    fn test_list_options_filter_is_percent_encoded() {
        let options = ListOptions::first_match("slug = 'demo-1'");
        let query = options.to_query_string();
        assert!(query.starts_with("?page=1&perPage=1&skipTotal=1&filter="));
        assert!(query.contains("slug%20%3D%20%27demo-1%27"), "got: {query}");
        assert!(!query.contains("slug = "), "raw filter leaked: {query}");
    }

    #[test]
    fn test_list_options_all_fields_fixed_order() {
        let options = ListOptions {
            page: Some(1),
            per_page: Some(10),
            skip_total: Some(false),
            filter: Some("published = true".to_string()),
            fields: Some("id,slug".to_string()),
            expand: Some("author".to_string()),
            sort: Some("-created".to_string()),
        };
        let query = options.to_query_string();
        let filter_pos = query.find("filter=").unwrap();
        let fields_pos = query.find("fields=").unwrap();
        let sort_pos = query.find("sort=").unwrap();
        assert!(query.starts_with("?page=1&perPage=10&skipTotal=0&"));
        assert!(filter_pos < fields_pos && fields_pos < sort_pos);
    }

    #[test]
    fn test_view_options_empty_renders_empty_string() {
        assert_eq!(ViewOptions::default().to_query_string(), "");
    }

    #[test]
    fn test_view_options_fields_and_expand() {
        let options = ViewOptions {
            fields: Some("id,title".to_string()),
            expand: Some("author".to_string()),
            sort: None,
        };
        assert_eq!(options.to_query_string(), "?fields=id%2Ctitle&expand=author");
    }
}
