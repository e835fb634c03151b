//! Reference list of real-world localities for address plausibility

use crate::error::EvaluatorError;
use crate::fields::normalize_text;
use std::collections::HashSet;
use std::path::Path;

/// Localities known without any configuration
const BUILTIN_LOCALITIES: &[&str] = &[
    // Indian cities and pharma hubs
    "Mumbai", "Navi Mumbai", "Thane", "Pune", "Nagpur", "Nashik", "Aurangabad",
    "Delhi", "New Delhi", "Noida", "Gurugram", "Gurgaon", "Faridabad", "Ghaziabad",
    "Bengaluru", "Bangalore", "Mysuru", "Mysore", "Hyderabad", "Secunderabad",
    "Visakhapatnam", "Vijayawada", "Chennai", "Coimbatore", "Madurai", "Kochi",
    "Thiruvananthapuram", "Kolkata", "Howrah", "Ahmedabad", "Vadodara", "Surat",
    "Rajkot", "Jaipur", "Udaipur", "Lucknow", "Kanpur", "Varanasi", "Agra", "Meerut",
    "Indore", "Bhopal", "Patna", "Ranchi", "Bhubaneswar", "Guwahati", "Chandigarh",
    "Ludhiana", "Amritsar", "Dehradun", "Shimla", "Baddi", "Srinagar", "Jammu",
    "Panaji", "Goa", "Sikkim", "Puducherry",
    // Indian states
    "Maharashtra", "Karnataka", "Gujarat", "Tamil Nadu", "Kerala", "Telangana",
    "Andhra Pradesh", "West Bengal", "Uttar Pradesh", "Uttarakhand", "Rajasthan",
    "Punjab", "Haryana", "Himachal Pradesh", "Madhya Pradesh", "Bihar", "Odisha",
    "Assam", "Jharkhand",
    // Countries
    "India", "United States", "USA", "United Kingdom", "UK", "Germany", "France",
    "Switzerland", "Ireland", "Netherlands", "Belgium", "Italy", "Spain", "China",
    "Japan", "Singapore", "Canada", "Australia", "United Arab Emirates", "UAE",
    // Major cities elsewhere
    "London", "Manchester", "Dublin", "Paris", "Lyon", "Berlin", "Frankfurt",
    "Munich", "Basel", "Geneva", "Zurich", "Amsterdam", "Brussels", "Milan",
    "Madrid", "Barcelona", "New York", "Boston", "Chicago", "Los Angeles",
    "San Francisco", "Philadelphia", "Toronto", "Montreal", "Tokyo", "Osaka",
    "Shanghai", "Beijing", "Shenzhen", "Hong Kong", "Dubai", "Abu Dhabi",
    "Sydney", "Melbourne",
];

/// Set of known localities, matched on whole words
///
/// # Examples
///
/// ```
/// use pharmatrace_evaluator::Gazetteer;
///
/// let gazetteer = Gazetteer::builtin();
/// assert!(gazetteer.mentions_locality("Plot 12, MIDC, Andheri East, Mumbai 400093"));
/// assert!(gazetteer.mentions_locality("Warehouse 4, new delhi"));
/// assert!(!gazetteer.mentions_locality("123 Fake Street, Nowhereville"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Gazetteer {
    localities: HashSet<String>,
    max_words: usize,
}

impl Gazetteer {
    /// Create an empty gazetteer
    pub fn new() -> Self {
        Self::default()
    }

    /// Gazetteer preloaded with the built-in localities
    pub fn builtin() -> Self {
        let mut gazetteer = Self::new();
        gazetteer.extend(BUILTIN_LOCALITIES.iter().copied());
        gazetteer
    }

    /// Add a locality name
    pub fn insert(&mut self, name: &str) {
        let normalized = normalize_text(name);
        if normalized.is_empty() {
            return;
        }
        self.max_words = self.max_words.max(normalized.split(' ').count());
        self.localities.insert(normalized);
    }

    /// Add several locality names
    pub fn extend<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) {
        for name in names {
            self.insert(name);
        }
    }

    /// Load extra localities from a file, one per line
    ///
    /// Blank lines and lines starting with `#` are ignored.
    pub fn load_file(&mut self, path: &Path) -> Result<usize, EvaluatorError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| EvaluatorError::Gazetteer(format!("{}: {}", path.display(), e)))?;

        let before = self.localities.len();
        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            self.insert(line);
        }
        Ok(self.localities.len() - before)
    }

    /// Number of known localities
    pub fn len(&self) -> usize {
        self.localities.len()
    }

    /// Whether the gazetteer is empty
    pub fn is_empty(&self) -> bool {
        self.localities.is_empty()
    }

    /// Whether any run of consecutive words in the text is a known locality
    pub fn mentions_locality(&self, text: &str) -> bool {
        let normalized = normalize_text(text);
        let words: Vec<&str> = normalized.split(' ').filter(|w| !w.is_empty()).collect();

        for start in 0..words.len() {
            for len in 1..=self.max_words.min(words.len() - start) {
                let candidate = words[start..start + len].join(" ");
                if self.localities.contains(&candidate) {
                    return true;
                }
            }
        }
        false
    }
}
