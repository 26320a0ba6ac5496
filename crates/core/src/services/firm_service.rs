use crate::models::firm::Firm;

/// Listing and lookup over loaded firms.
pub struct FirmService;

impl FirmService {
    pub fn new() -> Self {
        Self
    }

    /// Firms whose name or any focus tag contains `query` (case-insensitive).
    /// Order is preserved; an empty or blank query returns every firm.
    pub fn search<'a>(&self, firms: &'a [Firm], query: &str) -> Vec<&'a Firm> {
        firms.iter().filter(|f| f.matches(query)).collect()
    }

    /// Exact, case-insensitive name lookup.
    pub fn find_by_name<'a>(&self, firms: &'a [Firm], name: &str) -> Option<&'a Firm> {
        let wanted = name.trim().to_lowercase();
        firms.iter().find(|f| f.name.to_lowercase() == wanted)
    }
}

impl Default for FirmService {
    fn default() -> Self {
        Self::new()
    }
}
