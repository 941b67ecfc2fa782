//! XML utilities for navigating parsed NewsML trees.

mod utils;

pub use utils::{
    deep_text, direct_text, element_children, get_tag_name, has_local_name, matches_name,
};
