//! Search operations: query-string, prefix, terms, wildcard, tags,
//! geolocation and similarity searches over the backend's index.
//!
//! Every method returns one `Page`; the caller advances `pager.page`
//! manually, or uses [`find_all`](StrataClient::find_all) to walk pages.

use super::StrataClient;
use crate::errors::ClientResult;
use crate::object::GenericObject;
use crate::pager::{Page, Pager};
use crate::request::Operation;

/// Separator between a field name and its value in a terms query
const TERM_SEPARATOR: &str = ":";

impl StrataClient {
    /// Core search dispatch. Routes to `{type}/search/{queryType}` when a
    /// `type` parameter is present, `search/{queryType}` otherwise.
    pub(crate) async fn find(
        &self,
        query_type: &str,
        params: Vec<(String, String)>,
        pager: Option<&mut Pager>,
    ) -> ClientResult<Page> {
        if params.is_empty() {
            return Ok(Page::default());
        }
        let suffix = if query_type.is_empty() {
            "default".to_string()
        } else {
            query_type.to_string()
        };
        let object_type = params
            .iter()
            .find(|(k, v)| k == "type" && !v.is_empty())
            .map(|(_, v)| v.clone());
        let path = match object_type {
            Some(t) => format!("{}/search/{}", t, suffix),
            None => format!("search/{}", suffix),
        };
        self.get_page(Operation::get(&path).params(params), pager).await
    }

    fn search_params(object_type: &str, pager: &Option<&mut Pager>) -> Vec<(String, String)> {
        let mut params = pager.as_deref().map(Pager::to_params).unwrap_or_default();
        if !object_type.is_empty() {
            params.push(("type".to_string(), object_type.to_string()));
        }
        params
    }

    /// Simple query-string search across all types
    pub async fn search(&self, query: &str, pager: Option<&mut Pager>) -> ClientResult<Page> {
        self.find_query("", query, pager).await
    }

    /// Query-string search within one type. The basic search method.
    pub async fn find_query(
        &self,
        object_type: &str,
        query: &str,
        mut pager: Option<&mut Pager>,
    ) -> ClientResult<Page> {
        let mut params = Self::search_params(object_type, &pager);
        params.push(("q".to_string(), query.to_string()));
        self.find("", params, pager.as_deref_mut()).await
    }

    /// Single-id search
    pub async fn find_by_id(&self, id: &str) -> ClientResult<Option<GenericObject>> {
        let params = vec![("id".to_string(), id.to_string())];
        let page = self.find("id", params, None).await?;
        Ok(page.items.into_iter().next())
    }

    /// Multi-id search
    pub async fn find_by_ids(&self, ids: &[&str]) -> ClientResult<Vec<GenericObject>> {
        let params = ids
            .iter()
            .map(|id| ("ids".to_string(), id.to_string()))
            .collect();
        Ok(self.find("ids", params, None).await?.items)
    }

    /// Objects whose `field` value starts with `prefix`
    pub async fn find_prefix(
        &self,
        object_type: &str,
        field: &str,
        prefix: &str,
        mut pager: Option<&mut Pager>,
    ) -> ClientResult<Page> {
        let mut params = Self::search_params(object_type, &pager);
        params.push(("field".to_string(), field.to_string()));
        params.push(("prefix".to_string(), prefix.to_string()));
        self.find("prefix", params, pager.as_deref_mut()).await
    }

    /// Objects whose `field` value matches a wildcard pattern, e.g. `cat*`
    pub async fn find_wildcard(
        &self,
        object_type: &str,
        field: &str,
        wildcard: &str,
        mut pager: Option<&mut Pager>,
    ) -> ClientResult<Page> {
        let mut params = Self::search_params(object_type, &pager);
        params.push(("field".to_string(), field.to_string()));
        params.push(("q".to_string(), wildcard.to_string()));
        self.find("wildcard", params, pager.as_deref_mut()).await
    }

    /// Objects tagged with all of the given tags
    pub async fn find_tagged(
        &self,
        object_type: &str,
        tags: &[&str],
        mut pager: Option<&mut Pager>,
    ) -> ClientResult<Page> {
        let mut params = Self::search_params(object_type, &pager);
        for tag in tags {
            params.push(("tags".to_string(), tag.to_string()));
        }
        self.find("tagged", params, pager.as_deref_mut()).await
    }

    /// Search tag objects by keyword prefix
    pub async fn find_tags(
        &self,
        keyword: &str,
        pager: Option<&mut Pager>,
    ) -> ClientResult<Page> {
        let wildcard = if keyword.is_empty() {
            "*".to_string()
        } else {
            format!("{}*", keyword)
        };
        self.find_wildcard("tag", "tag", &wildcard, pager).await
    }

    /// Objects whose `field` value is one of `terms`
    pub async fn find_term_in_list(
        &self,
        object_type: &str,
        field: &str,
        terms: &[&str],
        mut pager: Option<&mut Pager>,
    ) -> ClientResult<Page> {
        let mut params = Self::search_params(object_type, &pager);
        params.push(("field".to_string(), field.to_string()));
        for term in terms {
            params.push(("terms".to_string(), term.to_string()));
        }
        self.find("in", params, pager.as_deref_mut()).await
    }

    /// Objects with properties matching the given field/value pairs.
    /// `match_all` selects AND semantics, otherwise OR.
    pub async fn find_terms(
        &self,
        object_type: &str,
        terms: &[(&str, &str)],
        match_all: bool,
        mut pager: Option<&mut Pager>,
    ) -> ClientResult<Page> {
        if terms.is_empty() {
            return Ok(Page::default());
        }
        let mut params = Self::search_params(object_type, &pager);
        params.push(("matchall".to_string(), match_all.to_string()));
        for (field, value) in terms {
            if !value.is_empty() {
                params.push((
                    "terms".to_string(),
                    format!("{}{}{}", field, TERM_SEPARATOR, value),
                ));
            }
        }
        self.find("terms", params, pager.as_deref_mut()).await
    }

    /// "Find like this": objects with property values similar to a text
    pub async fn find_similar(
        &self,
        object_type: &str,
        filter_id: &str,
        fields: &[&str],
        like_text: &str,
        mut pager: Option<&mut Pager>,
    ) -> ClientResult<Page> {
        let mut params = Self::search_params(object_type, &pager);
        for field in fields {
            params.push(("fields".to_string(), field.to_string()));
        }
        params.push(("filterid".to_string(), filter_id.to_string()));
        params.push(("like".to_string(), like_text.to_string()));
        self.find("similar", params, pager.as_deref_mut()).await
    }

    /// Geo search: objects of a type within `radius_km` of a point
    pub async fn find_nearby(
        &self,
        object_type: &str,
        query: &str,
        radius_km: u32,
        lat: f64,
        lng: f64,
        mut pager: Option<&mut Pager>,
    ) -> ClientResult<Page> {
        let mut params = Self::search_params(object_type, &pager);
        params.push(("latlng".to_string(), format!("{},{}", lat, lng)));
        params.push(("radius".to_string(), radius_km.to_string()));
        params.push(("q".to_string(), query.to_string()));
        self.find("nearby", params, pager.as_deref_mut()).await
    }

    /// Search within a nested field
    pub async fn find_nested_query(
        &self,
        object_type: &str,
        field: &str,
        query: &str,
        mut pager: Option<&mut Pager>,
    ) -> ClientResult<Page> {
        let mut params = Self::search_params(object_type, &pager);
        params.push(("q".to_string(), query.to_string()));
        params.push(("field".to_string(), field.to_string()));
        self.find("nested", params, pager.as_deref_mut()).await
    }

    /// Number of indexed objects of a type
    pub async fn count(&self, object_type: &str) -> ClientResult<u64> {
        let mut pager = Pager::default();
        let params = vec![("type".to_string(), object_type.to_string())];
        self.find("count", params, Some(&mut pager)).await?;
        Ok(pager.count.unwrap_or(0))
    }

    /// Number of indexed objects matching the given terms
    pub async fn count_terms(
        &self,
        object_type: &str,
        terms: &[(&str, &str)],
    ) -> ClientResult<u64> {
        if terms.is_empty() {
            return self.count(object_type).await;
        }
        let mut pager = Pager::default();
        let mut params: Vec<(String, String)> = terms
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(f, v)| ("terms".to_string(), format!("{}{}{}", f, TERM_SEPARATOR, v)))
            .collect();
        params.push(("type".to_string(), object_type.to_string()));
        params.push(("count".to_string(), "true".to_string()));
        self.find("terms", params, Some(&mut pager)).await?;
        Ok(pager.count.unwrap_or(0))
    }

    /// Walk every page of a query-string search. Stops on the first empty
    /// page or at the server-reported total, whichever comes first.
    pub async fn find_all(
        &self,
        object_type: &str,
        query: &str,
        page_size: u64,
    ) -> ClientResult<Vec<GenericObject>> {
        let mut pager = Pager::new(1, page_size);
        let mut all = Vec::new();
        loop {
            let page = self.find_query(object_type, query, Some(&mut pager)).await?;
            if page.is_empty() {
                break;
            }
            all.extend(page.items);
            if let Some(total) = pager.count {
                if all.len() as u64 >= total {
                    break;
                }
            }
            pager.page += 1;
        }
        Ok(all)
    }

    /// Format a field/value pair as a terms-query value
    pub fn term(field: &str, value: &str) -> String {
        format!("{}{}{}", field, TERM_SEPARATOR, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_term_formatting() {
        assert_eq!(StrataClient::term("country", "US"), "country:US");
    }
}
