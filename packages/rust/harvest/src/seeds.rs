//! Curated known-good references injected by the seed round.

use briefwright_shared::CandidateSource;

use crate::topic::Topic;

/// One curated reference and the topic keywords that select it.
#[derive(Debug, Clone)]
pub struct SeedReference {
    pub url: String,
    pub title: String,
    pub snippet: String,
    pub keywords: Vec<String>,
}

impl SeedReference {
    pub fn new(url: &str, title: &str, snippet: &str, keywords: &[&str]) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            snippet: snippet.into(),
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    fn to_candidate(&self) -> CandidateSource {
        CandidateSource::new(&self.url, &self.title, &self.snippet)
    }
}

/// A catalog of curated references filtered by topic keyword overlap.
#[derive(Debug, Clone, Default)]
pub struct SeedCatalog {
    entries: Vec<SeedReference>,
}

impl SeedCatalog {
    pub fn new(entries: Vec<SeedReference>) -> Self {
        Self { entries }
    }

    /// An empty catalog; the seed round then contributes nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// References sharing at least one keyword with the topic, in catalog order.
    pub fn matching(&self, topic: &Topic) -> Vec<CandidateSource> {
        self.entries
            .iter()
            .filter(|seed| seed.keywords.iter().any(|k| topic.mentions(k)))
            .map(SeedReference::to_candidate)
            .collect()
    }

    /// The built-in reference catalog.
    pub fn builtin() -> Self {
        const ANTS: &[&str] = &["ant", "formicidae", "colony", "insect", "entomology", "myrmecology"];
        const BEES: &[&str] = &["bee", "honeybee", "pollinator", "pollination", "insect", "hive"];
        const BUTTERFLIES: &[&str] = &["butterfly", "butterflies", "monarch", "caterpillar", "lepidoptera", "insect"];
        const CLIMATE: &[&str] = &["climate", "warming", "greenhouse", "carbon", "emissions"];
        const OCEANS: &[&str] = &["ocean", "marine", "sea", "reef", "coral"];
        const VOLCANOES: &[&str] = &["volcano", "volcanoes", "volcanic", "eruption", "magma", "lava"];
        const SPACE: &[&str] = &["solar", "planet", "planets", "space", "astronomy", "moon"];
        const BODY: &[&str] = &["human", "body", "anatomy", "organ", "organs", "health"];
        const PLANTS: &[&str] = &["plant", "botany", "photosynthesis", "flower", "tree", "forest"];
        const DINOSAURS: &[&str] = &["dinosaur", "fossil", "fossils", "paleontology", "jurassic"];

        Self::new(vec![
            SeedReference::new(
                "https://www.britannica.com/animal/ant",
                "Ant | Definition, Characteristics, & Facts | Britannica",
                "Ants are social insects of the family Formicidae with complete metamorphosis.",
                ANTS,
            ),
            SeedReference::new(
                "https://entnemdept.ufl.edu/creatures/",
                "Featured Creatures - University of Florida Entomology",
                "Profiles of insects including ant life history and biology.",
                ANTS,
            ),
            SeedReference::new(
                "https://www.si.edu/spotlight/buginfo/ants",
                "Ants - Smithsonian Institution BugInfo",
                "Smithsonian entomology notes on ant colonies and development.",
                ANTS,
            ),
            SeedReference::new(
                "https://extension.psu.edu/ants",
                "Ants - Penn State Extension",
                "Identification, biology, and life cycle of common ants.",
                ANTS,
            ),
            SeedReference::new(
                "https://www.antweb.org/",
                "AntWeb - California Academy of Sciences",
                "Specimen database and imagery of the world's ants.",
                ANTS,
            ),
            SeedReference::new(
                "https://www.fs.usda.gov/wildflowers/pollinators/",
                "Pollinators - US Forest Service",
                "Bees, butterflies and other pollinators and their role in ecosystems.",
                BEES,
            ),
            SeedReference::new(
                "https://www.britannica.com/animal/bee",
                "Bee | Britannica",
                "Bees are insects of the superfamily Apoidea, important pollinators.",
                BEES,
            ),
            SeedReference::new(
                "https://www.fs.usda.gov/wildflowers/pollinators/Monarch_Butterfly/",
                "Monarch Butterfly - US Forest Service",
                "Monarch biology, migration and life cycle.",
                BUTTERFLIES,
            ),
            SeedReference::new(
                "https://www.britannica.com/animal/butterfly-insect",
                "Butterfly | Britannica",
                "Butterflies are insects of the order Lepidoptera.",
                BUTTERFLIES,
            ),
            SeedReference::new(
                "https://science.nasa.gov/climate-change/",
                "Climate Change - NASA Science",
                "Evidence, causes and effects of global climate change.",
                CLIMATE,
            ),
            SeedReference::new(
                "https://www.noaa.gov/climate",
                "Climate - National Oceanic and Atmospheric Administration",
                "Climate data, monitoring and research from NOAA.",
                CLIMATE,
            ),
            SeedReference::new(
                "https://www.ipcc.ch/reports/",
                "Reports - Intergovernmental Panel on Climate Change",
                "Assessment reports on the physical science basis of climate change.",
                CLIMATE,
            ),
            SeedReference::new(
                "https://oceanservice.noaa.gov/facts/",
                "Ocean Facts - NOAA National Ocean Service",
                "Short answers to common questions about the ocean and coasts.",
                OCEANS,
            ),
            SeedReference::new(
                "https://www.britannica.com/science/ocean",
                "Ocean | Britannica",
                "Physical and biological characteristics of the world ocean.",
                OCEANS,
            ),
            SeedReference::new(
                "https://www.usgs.gov/programs/VHP",
                "Volcano Hazards Program - USGS",
                "Monitoring and research on volcanic activity and hazards.",
                VOLCANOES,
            ),
            SeedReference::new(
                "https://volcano.si.edu/",
                "Global Volcanism Program - Smithsonian Institution",
                "Catalog of Holocene volcanoes and eruption history.",
                VOLCANOES,
            ),
            SeedReference::new(
                "https://science.nasa.gov/solar-system/",
                "Our Solar System - NASA Science",
                "Planets, moons and small bodies of the solar system.",
                SPACE,
            ),
            SeedReference::new(
                "https://www.britannica.com/science/solar-system",
                "Solar System | Britannica",
                "Structure and origin of the solar system.",
                SPACE,
            ),
            SeedReference::new(
                "https://medlineplus.gov/anatomy.html",
                "Anatomy - MedlinePlus, National Library of Medicine",
                "Health information about body systems and organs.",
                BODY,
            ),
            SeedReference::new(
                "https://www.britannica.com/science/human-body",
                "Human body | Britannica",
                "Organ systems and structure of the human body.",
                BODY,
            ),
            SeedReference::new(
                "https://www.britannica.com/plant/plant",
                "Plant | Britannica",
                "Characteristics, evolution and classification of plants.",
                PLANTS,
            ),
            SeedReference::new(
                "https://www.fs.usda.gov/wildflowers/",
                "Celebrating Wildflowers - US Forest Service",
                "Native plant ecology and botany resources.",
                PLANTS,
            ),
            SeedReference::new(
                "https://www.nhm.ac.uk/discover/dino-directory.html",
                "Dino Directory - Natural History Museum",
                "Profiles of dinosaur species and the fossils that describe them.",
                DINOSAURS,
            ),
            SeedReference::new(
                "https://www.britannica.com/animal/dinosaur",
                "Dinosaur | Britannica",
                "Dinosaur origins, classification and extinction.",
                DINOSAURS,
            ),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ant_prompt_selects_ant_references() {
        let catalog = SeedCatalog::builtin();
        let topic = Topic::from_prompt("ant life cycle report");
        let seeds = catalog.matching(&topic);
        assert_eq!(seeds.len(), 5);
        assert!(seeds.iter().all(|s| s.url.contains("ant") || s.url.contains("creatures")));
    }

    #[test]
    fn shared_keywords_pull_several_groups() {
        let catalog = SeedCatalog::builtin();
        let topic = Topic::from_prompt("insect diversity");
        let seeds = catalog.matching(&topic);
        // ants, bees and butterflies are all tagged "insect"
        assert_eq!(seeds.len(), 5 + 2 + 2);
    }

    #[test]
    fn unrelated_topic_selects_nothing() {
        let catalog = SeedCatalog::builtin();
        let topic = Topic::from_prompt("quarterly revenue of widget makers");
        assert!(catalog.matching(&topic).is_empty());
        assert!(SeedCatalog::empty().matching(&topic).is_empty());
    }
}
