use std::collections::HashMap;

/// Hand-picked photos for dishes vendors list most often. Synonyms share a URL.
const CURATED_IMAGES: &[(&str, &str)] = &[
    // Indian
    ("pav bhaji", "https://cdn.pixabay.com/photo/2020/01/16/11/49/pav-bhaji-4770943_1280.jpg"),
    ("bhaji", "https://cdn.pixabay.com/photo/2020/01/16/11/49/pav-bhaji-4770943_1280.jpg"),
    ("pav", "https://cdn.pixabay.com/photo/2020/01/16/11/49/pav-bhaji-4770943_1280.jpg"),
    ("dosa", "https://cdn.pixabay.com/photo/2017/06/16/11/38/dosa-2408952_1280.jpg"),
    ("biryani", "https://cdn.pixabay.com/photo/2019/01/29/18/05/biryani-3962073_1280.jpg"),
    ("curry", "https://cdn.pixabay.com/photo/2017/06/16/11/38/curry-2408952_1280.jpg"),
    ("dal", "https://cdn.pixabay.com/photo/2017/06/16/11/38/dal-2408952_1280.jpg"),
    ("roti", "https://cdn.pixabay.com/photo/2017/06/23/23/57/bread-2434370_1280.jpg"),
    ("chapati", "https://cdn.pixabay.com/photo/2017/06/23/23/57/bread-2434370_1280.jpg"),
    ("naan", "https://cdn.pixabay.com/photo/2017/06/23/23/57/bread-2434370_1280.jpg"),
    ("samosa", "https://cdn.pixabay.com/photo/2020/03/29/10/17/samosa-4981648_1280.jpg"),
    ("idli", "https://cdn.pixabay.com/photo/2017/06/16/11/38/idli-2408952_1280.jpg"),
    ("vada", "https://cdn.pixabay.com/photo/2017/06/16/11/38/vada-2408952_1280.jpg"),
    ("poha", "https://cdn.pixabay.com/photo/2014/12/11/02/55/rice-563612_1280.jpg"),
    ("upma", "https://cdn.pixabay.com/photo/2014/12/11/02/55/rice-563612_1280.jpg"),
    ("paratha", "https://cdn.pixabay.com/photo/2017/06/23/23/57/bread-2434370_1280.jpg"),
    ("chole", "https://cdn.pixabay.com/photo/2017/06/16/11/38/curry-2408952_1280.jpg"),
    ("rajma", "https://cdn.pixabay.com/photo/2017/06/16/11/38/curry-2408952_1280.jpg"),
    ("paneer", "https://cdn.pixabay.com/photo/2017/06/16/11/38/paneer-2408952_1280.jpg"),
    ("butter chicken", "https://cdn.pixabay.com/photo/2020/06/30/15/03/chicken-5356775_1280.jpg"),
    ("tandoori", "https://cdn.pixabay.com/photo/2020/06/30/15/03/chicken-5356775_1280.jpg"),
    ("masala", "https://cdn.pixabay.com/photo/2017/06/16/11/38/curry-2408952_1280.jpg"),
    // International
    ("pizza", "https://cdn.pixabay.com/photo/2017/12/09/08/18/pizza-3007395_1280.jpg"),
    ("burger", "https://cdn.pixabay.com/photo/2016/03/05/19/02/hamburger-1238246_1280.jpg"),
    ("pasta", "https://cdn.pixabay.com/photo/2018/07/18/19/12/pasta-3547078_1280.jpg"),
    ("rice", "https://cdn.pixabay.com/photo/2014/12/11/02/55/rice-563612_1280.jpg"),
    ("chicken", "https://cdn.pixabay.com/photo/2020/06/30/15/03/chicken-5356775_1280.jpg"),
    ("fish", "https://cdn.pixabay.com/photo/2014/11/05/15/57/salmon-518032_1280.jpg"),
    ("salad", "https://cdn.pixabay.com/photo/2017/05/11/19/20/belly-2305346_1280.jpg"),
    ("soup", "https://cdn.pixabay.com/photo/2017/06/16/11/38/soup-2408952_1280.jpg"),
    ("bread", "https://cdn.pixabay.com/photo/2017/06/23/23/57/bread-2434370_1280.jpg"),
    ("cake", "https://cdn.pixabay.com/photo/2017/01/11/11/33/cake-1971552_1280.jpg"),
    ("sandwich", "https://cdn.pixabay.com/photo/2017/05/07/08/56/sandwich-2293271_1280.jpg"),
    ("noodles", "https://cdn.pixabay.com/photo/2017/03/23/19/57/asparagus-2169305_1280.jpg"),
    ("steak", "https://cdn.pixabay.com/photo/2016/01/22/02/13/meat-1155132_1280.jpg"),
    ("eggs", "https://cdn.pixabay.com/photo/2014/07/08/12/34/food-386733_1280.jpg"),
];

/// Lower-case and trim; the only normalization keys and queries share.
pub fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupMatch<'a> {
    pub key: &'a str,
    pub url: &'a str,
    pub exact: bool,
}

/// Keyword → image URL table. Read-only once built.
#[derive(Debug, Clone)]
pub struct LookupTable {
    entries: HashMap<String, String>,
}

impl LookupTable {
    pub fn curated() -> Self {
        Self::from_entries(CURATED_IMAGES.iter().copied())
    }

    pub fn from_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let entries = entries
            .into_iter()
            .map(|(key, url)| (normalize(key), url.to_string()))
            .filter(|(key, _)| !key.is_empty())
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact key first, then the longest key that contains or is contained by the name.
    ///
    /// Equal-length partial candidates are not ordered; any of them may win.
    pub fn find(&self, dish_name: &str) -> Option<LookupMatch<'_>> {
        let name = normalize(dish_name);
        if name.is_empty() {
            // "" is a substring of every key
            return None;
        }

        if let Some((key, url)) = self.entries.get_key_value(&name) {
            return Some(LookupMatch { key, url, exact: true });
        }

        self.entries
            .iter()
            .filter(|(key, _)| name.contains(key.as_str()) || key.contains(name.as_str()))
            .max_by_key(|(key, _)| key.len())
            .map(|(key, url)| LookupMatch { key, url, exact: false })
    }
}

impl Default for LookupTable {
    fn default() -> Self {
        Self::curated()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_is_case_and_space_insensitive() {
        let table = LookupTable::curated();
        let hit = table.find("  Butter Chicken ").unwrap();

        assert!(hit.exact);
        assert_eq!(hit.key, "butter chicken");
        assert_eq!(
            hit.url,
            "https://cdn.pixabay.com/photo/2020/06/30/15/03/chicken-5356775_1280.jpg"
        );
    }

    #[test]
    fn test_partial_match_prefers_longest_key() {
        let table = LookupTable::from_entries([
            ("chicken", "https://img.test/chicken.jpg"),
            ("butter chicken", "https://img.test/butter-chicken.jpg"),
            ("masala", "https://img.test/masala.jpg"),
        ]);

        let hit = table.find("Butter Chicken Masala").unwrap();
        assert!(!hit.exact);
        assert_eq!(hit.url, "https://img.test/butter-chicken.jpg");
    }

    #[test]
    fn test_name_contained_in_key_matches() {
        let table = LookupTable::from_entries([("pav bhaji", "https://img.test/pav-bhaji.jpg")]);
        let hit = table.find("bhaj").unwrap();
        assert_eq!(hit.key, "pav bhaji");
    }

    #[test]
    fn test_equal_length_tie_returns_one_of_the_candidates() {
        let table = LookupTable::from_entries([
            ("dosa", "https://img.test/dosa.jpg"),
            ("idli", "https://img.test/idli.jpg"),
        ]);

        let hit = table.find("idli dosa combo").unwrap();
        assert!(["https://img.test/dosa.jpg", "https://img.test/idli.jpg"].contains(&hit.url));
    }

    #[test]
    fn test_blank_name_never_matches() {
        let table = LookupTable::curated();
        assert!(table.find("").is_none());
        assert!(table.find("   ").is_none());
    }

    #[test]
    fn test_unknown_dish_has_no_match() {
        let table = LookupTable::curated();
        assert!(table.find("Quinoa Foam Deconstruction").is_none());
    }

    #[test]
    fn test_curated_table_is_populated() {
        let table = LookupTable::curated();
        assert_eq!(table.len(), CURATED_IMAGES.len());
        assert!(!table.is_empty());
    }
}
