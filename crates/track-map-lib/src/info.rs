//! Name/value information exposed to status displays

use std::collections::BTreeMap;

/// Ordered name/value pairs describing an item, for on-screen status display
pub type InfoMap = BTreeMap<String, String>;

/// Items that can describe themselves in a status panel
pub trait InformationProvider {
    fn info(&self) -> InfoMap;
}
