use crc32fast::Hasher;

use crate::node::{NodeId, NodeType};
use crate::page::Page;

/// Stable per-page seed: CRC32 of the page id, in hex
pub fn page_seed(page_id: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(page_id.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Sequential node id generator for one editing session
#[derive(Debug, Clone)]
pub struct IdGenerator {
    seed: String, // Page id (CRC32)
    count: u64,   // Sequential counter
}

impl IdGenerator {
    pub fn new(page_id: &str) -> Self {
        Self {
            seed: page_seed(page_id),
            count: 0,
        }
    }

    pub fn from_seed(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            count: 0,
        }
    }

    /// Next id of the form `n_<type>_<seed>_<counter>`.
    ///
    /// If the page already holds that id, `_<i>` is appended with the
    /// smallest `i` that frees it.
    pub fn next_id(&mut self, node_type: NodeType, page: &Page) -> NodeId {
        self.count += 1;
        let base = format!("n_{}_{}_{}", node_type.slug(), self.seed, self.count);
        if !page.contains(&base) {
            return base;
        }

        let mut i = 1u32;
        loop {
            let candidate = format!("{}_{}", base, i);
            if !page.contains(&candidate) {
                return candidate;
            }
            i += 1;
        }
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    pub fn count(&self) -> u64 {
        self.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;
    use crate::seed::home_page;

    #[test]
    fn test_page_seed_is_stable() {
        assert_eq!(page_seed("home"), page_seed("home"));
        assert_ne!(page_seed("home"), page_seed("about"));
    }

    #[test]
    fn test_sequential_ids() {
        let page = home_page().unwrap();
        let mut gen = IdGenerator::new("home");

        let id1 = gen.next_id(NodeType::Text, &page);
        let id2 = gen.next_id(NodeType::ProductCard, &page);

        assert_eq!(id1, format!("n_text_{}_1", gen.seed()));
        assert_eq!(id2, format!("n_product_card_{}_2", gen.seed()));
    }

    #[test]
    fn test_collision_gets_suffix() {
        let taken = "n_block_s_1";
        let page = home_page()
            .unwrap()
            .with_node(Node::new(taken, NodeType::Block))
            .with_node(Node::new(format!("{}_1", taken), NodeType::Block));

        let mut gen = IdGenerator::from_seed("s");
        assert_eq!(gen.next_id(NodeType::Block, &page), "n_block_s_1_2");
        assert_eq!(gen.next_id(NodeType::Block, &page), "n_block_s_2");
    }
}
