//! Study reference data per SIGTRACK-SPEC §4 supplement
//!
//! Centers and countries are consulted only to decorate the workbook report
//! (region/affiliation/contact columns); neither participates in signature
//! evaluation. Grounded in the original `centers.c` / `centers.h` loaders.

use crate::rangeset::RangeSet;

#[derive(Debug, Clone)]
pub struct Center {
    pub number: i64,
    pub is_error_monitor: bool,
    pub contact: String,
    pub affiliation: String,
    pub address: String,
    pub primary_fax: String,
    pub secondary_fax: String,
    pub phone: String,
    pub investigator: String,
    pub investigator_phone: String,
    pub reply_address: String,
    pub pids: RangeSet,
}

#[derive(Debug, Clone, Default)]
pub struct Centers {
    centers: Vec<Center>,
}

impl Centers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, center: Center) {
        self.centers.push(center);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Center> {
        self.centers.iter()
    }

    /// The center whose patient range contains `pid`, falling back to the
    /// first designated error-monitor center, or `0` if neither exists.
    pub fn find(&self, pid: i64) -> i64 {
        if let Some(c) = self.centers.iter().find(|c| c.pids.contains(pid)) {
            return c.number;
        }
        if let Some(c) = self.centers.iter().find(|c| c.is_error_monitor) {
            return c.number;
        }
        0
    }

    pub fn get(&self, number: i64) -> Option<&Center> {
        self.centers.iter().find(|c| c.number == number)
    }
}

#[derive(Debug, Clone)]
pub struct Country {
    pub name: String,
    pub region: String,
    pub centers: RangeSet,
}

#[derive(Debug, Clone, Default)]
pub struct Countries {
    countries: Vec<Country>,
}

impl Countries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, country: Country) {
        self.countries.push(country);
    }

    pub fn find_country(&self, center: i64) -> &str {
        self.countries
            .iter()
            .find(|c| c.centers.contains(center))
            .map(|c| c.name.as_str())
            .unwrap_or("Unknown")
    }

    pub fn find_region(&self, center: i64) -> &str {
        self.countries
            .iter()
            .find(|c| c.centers.contains(center))
            .map(|c| c.region.as_str())
            .unwrap_or("Unknown")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn center(number: i64, pids: &str, is_error_monitor: bool) -> Center {
        Center {
            number,
            is_error_monitor,
            contact: String::new(),
            affiliation: String::new(),
            address: String::new(),
            primary_fax: String::new(),
            secondary_fax: String::new(),
            phone: String::new(),
            investigator: String::new(),
            investigator_phone: String::new(),
            reply_address: String::new(),
            pids: RangeSet::parse(pids).unwrap(),
        }
    }

    #[test]
    fn finds_center_by_pid_range() {
        let mut centers = Centers::new();
        centers.push(center(1, "100-199", false));
        centers.push(center(2, "200-299", false));
        assert_eq!(centers.find(150), 1);
        assert_eq!(centers.find(250), 2);
    }

    #[test]
    fn falls_back_to_error_monitor_center() {
        let mut centers = Centers::new();
        centers.push(center(1, "100-199", false));
        centers.push(center(99, "", true));
        assert_eq!(centers.find(999), 99);
    }

    #[test]
    fn returns_zero_when_no_match_and_no_error_monitor() {
        let centers = Centers::new();
        assert_eq!(centers.find(1), 0);
    }

    #[test]
    fn unknown_country_and_region_for_unmatched_center() {
        let countries = Countries::new();
        assert_eq!(countries.find_country(1), "Unknown");
        assert_eq!(countries.find_region(1), "Unknown");
    }
}
