use tracing::info;

use crate::error::SchemaResult;
use crate::page::Page;

/// Home page used to start a session when no page is supplied
pub const HOME_PAGE_JSON: &str = include_str!("../fixtures/home.page.json");

pub fn home_page() -> SchemaResult<Page> {
    let page = Page::from_json(HOME_PAGE_JSON)?;
    info!(page_id = %page.page_id, nodes = page.node_count(), "loaded seed page");
    Ok(page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_seed_numbers_are_written_back_unchanged() {
        let written: serde_json::Value =
            serde_json::from_str(&home_page().unwrap().to_json_pretty().unwrap()).unwrap();

        let tokens = &written["designTokens"];
        assert_eq!(tokens["cardRadius"], json!(12));
        assert_eq!(tokens["fontScale"]["mobile"], json!(1));
        assert_eq!(tokens["fontScale"]["desktop"], json!(1.05));

        let header = &written["nodes"]["n_header_root"]["props"];
        assert_eq!(header["base"]["gap"], json!(12));
        assert_eq!(
            header["base"]["padding"],
            json!({"top": 12, "right": 16, "bottom": 12, "left": 16})
        );
        assert_eq!(header["overrides"]["desktop"]["padding"]["left"], json!(24));
    }
}
