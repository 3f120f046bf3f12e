use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Marketplace category a listing is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListingCategory {
    #[serde(rename = "laptops")]
    Laptops,
    #[serde(rename = "desktops")]
    Desktops,
    #[serde(rename = "consoles")]
    Consoles,
    #[serde(rename = "pc accessories")]
    PcAccessories,
    #[serde(rename = "pc components")]
    PcComponents,
    #[serde(rename = "spare electronic parts")]
    SpareElectronicParts,
    #[serde(rename = "software")]
    Software,
    #[serde(rename = "games")]
    Games,
    #[serde(rename = "phones")]
    Phones,
    #[serde(rename = "phone cases")]
    PhoneCases,
    #[serde(rename = "phone accessories")]
    PhoneAccessories,
    #[serde(rename = "smart watches")]
    SmartWatches,
    #[serde(rename = "tvs")]
    Tvs,
    #[serde(rename = "cameras")]
    Cameras,
    #[serde(rename = "drones")]
    Drones,
    #[serde(rename = "body care devices")]
    BodyCareDevices,
    #[serde(rename = "home appliances")]
    HomeAppliances,
    #[serde(rename = "other electronics")]
    OtherElectronics,
    #[serde(rename = "cars")]
    Cars,
    #[serde(rename = "car accessories")]
    CarAccessories,
    #[serde(rename = "car parts")]
    CarParts,
    #[serde(rename = "motorcycles")]
    Motorcycles,
    #[serde(rename = "motorcycle parts")]
    MotorcycleParts,
    #[serde(rename = "indoor furniture")]
    IndoorFurniture,
    #[serde(rename = "outdoor furniture")]
    OutdoorFurniture,
    #[serde(rename = "kitchenware")]
    Kitchenware,
    #[serde(rename = "tools")]
    Tools,
    #[serde(rename = "smart home electronics")]
    SmartHomeElectronics,
    #[serde(rename = "building materials")]
    BuildingMaterials,
    #[serde(rename = "animals")]
    Animals,
    #[serde(rename = "bikes")]
    Bikes,
    #[serde(rename = "fishing tools")]
    FishingTools,
    #[serde(rename = "fishing supplies")]
    FishingSupplies,
    #[serde(rename = "outdoor and hiking equipment")]
    OutdoorAndHikingEquipment,
    #[serde(rename = "workout equipment")]
    WorkoutEquipment,
    #[serde(rename = "water sports equipment")]
    WaterSportsEquipment,
    #[serde(rename = "winter sports equipment")]
    WinterSportsEquipment,
    #[serde(rename = "other sports equipment")]
    OtherSportsEquipment,
    #[serde(rename = "board games")]
    BoardGames,
    #[serde(rename = "card games")]
    CardGames,
    #[serde(rename = "party games")]
    PartyGames,
    #[serde(rename = "puzzles")]
    Puzzles,
    #[serde(rename = "sets")]
    Sets,
    #[serde(rename = "films")]
    Films,
    #[serde(rename = "music")]
    Music,
    #[serde(rename = "musical instruments")]
    MusicalInstruments,
    #[serde(rename = "music equipment")]
    MusicEquipment,
    #[serde(rename = "books")]
    Books,
    #[serde(rename = "magazines")]
    Magazines,
    #[serde(rename = "comics")]
    Comics,
    #[serde(rename = "textbooks")]
    Textbooks,
    #[serde(rename = "maps and guides")]
    MapsAndGuides,
    #[serde(rename = "other printed media")]
    OtherPrintedMedia,
    #[serde(rename = "men's clothing")]
    MensClothing,
    #[serde(rename = "women's clothing")]
    WomensClothing,
    #[serde(rename = "underwear")]
    Underwear,
    #[serde(rename = "bags")]
    Bags,
    #[serde(rename = "handbags")]
    Handbags,
    #[serde(rename = "fashion accessories")]
    FashionAccessories,
    #[serde(rename = "men's shoes")]
    MensShoes,
    #[serde(rename = "women's shoes")]
    WomensShoes,
    #[serde(rename = "jewelry")]
    Jewelry,
    #[serde(rename = "wristwatches")]
    Wristwatches,
    #[serde(rename = "medical supplies")]
    MedicalSupplies,
    #[serde(rename = "collectibles")]
    Collectibles,
    #[serde(rename = "other")]
    Other,
}

/// Every category with its name on the wire and in the database, in
/// declaration order.
pub static CATEGORIES: [(ListingCategory, &str); 66] = [
    (ListingCategory::Laptops, "laptops"),
    (ListingCategory::Desktops, "desktops"),
    (ListingCategory::Consoles, "consoles"),
    (ListingCategory::PcAccessories, "pc accessories"),
    (ListingCategory::PcComponents, "pc components"),
    (ListingCategory::SpareElectronicParts, "spare electronic parts"),
    (ListingCategory::Software, "software"),
    (ListingCategory::Games, "games"),
    (ListingCategory::Phones, "phones"),
    (ListingCategory::PhoneCases, "phone cases"),
    (ListingCategory::PhoneAccessories, "phone accessories"),
    (ListingCategory::SmartWatches, "smart watches"),
    (ListingCategory::Tvs, "tvs"),
    (ListingCategory::Cameras, "cameras"),
    (ListingCategory::Drones, "drones"),
    (ListingCategory::BodyCareDevices, "body care devices"),
    (ListingCategory::HomeAppliances, "home appliances"),
    (ListingCategory::OtherElectronics, "other electronics"),
    (ListingCategory::Cars, "cars"),
    (ListingCategory::CarAccessories, "car accessories"),
    (ListingCategory::CarParts, "car parts"),
    (ListingCategory::Motorcycles, "motorcycles"),
    (ListingCategory::MotorcycleParts, "motorcycle parts"),
    (ListingCategory::IndoorFurniture, "indoor furniture"),
    (ListingCategory::OutdoorFurniture, "outdoor furniture"),
    (ListingCategory::Kitchenware, "kitchenware"),
    (ListingCategory::Tools, "tools"),
    (ListingCategory::SmartHomeElectronics, "smart home electronics"),
    (ListingCategory::BuildingMaterials, "building materials"),
    (ListingCategory::Animals, "animals"),
    (ListingCategory::Bikes, "bikes"),
    (ListingCategory::FishingTools, "fishing tools"),
    (ListingCategory::FishingSupplies, "fishing supplies"),
    (ListingCategory::OutdoorAndHikingEquipment, "outdoor and hiking equipment"),
    (ListingCategory::WorkoutEquipment, "workout equipment"),
    (ListingCategory::WaterSportsEquipment, "water sports equipment"),
    (ListingCategory::WinterSportsEquipment, "winter sports equipment"),
    (ListingCategory::OtherSportsEquipment, "other sports equipment"),
    (ListingCategory::BoardGames, "board games"),
    (ListingCategory::CardGames, "card games"),
    (ListingCategory::PartyGames, "party games"),
    (ListingCategory::Puzzles, "puzzles"),
    (ListingCategory::Sets, "sets"),
    (ListingCategory::Films, "films"),
    (ListingCategory::Music, "music"),
    (ListingCategory::MusicalInstruments, "musical instruments"),
    (ListingCategory::MusicEquipment, "music equipment"),
    (ListingCategory::Books, "books"),
    (ListingCategory::Magazines, "magazines"),
    (ListingCategory::Comics, "comics"),
    (ListingCategory::Textbooks, "textbooks"),
    (ListingCategory::MapsAndGuides, "maps and guides"),
    (ListingCategory::OtherPrintedMedia, "other printed media"),
    (ListingCategory::MensClothing, "men's clothing"),
    (ListingCategory::WomensClothing, "women's clothing"),
    (ListingCategory::Underwear, "underwear"),
    (ListingCategory::Bags, "bags"),
    (ListingCategory::Handbags, "handbags"),
    (ListingCategory::FashionAccessories, "fashion accessories"),
    (ListingCategory::MensShoes, "men's shoes"),
    (ListingCategory::WomensShoes, "women's shoes"),
    (ListingCategory::Jewelry, "jewelry"),
    (ListingCategory::Wristwatches, "wristwatches"),
    (ListingCategory::MedicalSupplies, "medical supplies"),
    (ListingCategory::Collectibles, "collectibles"),
    (ListingCategory::Other, "other"),
];

impl ListingCategory {
    pub fn as_str(self) -> &'static str {
        CATEGORIES[self as usize].1
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory(pub String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown listing category '{}'", self.0)
    }
}

impl std::error::Error for UnknownCategory {}

impl FromStr for ListingCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CATEGORIES
            .iter()
            .find(|(_, name)| *name == s)
            .map(|(category, _)| *category)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

impl fmt::Display for ListingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_unique() {
        let mut names: Vec<_> = CATEGORIES.iter().map(|(_, name)| *name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), CATEGORIES.len());
    }

    #[test]
    fn table_follows_declaration_order() {
        for (i, (category, name)) in CATEGORIES.iter().enumerate() {
            assert_eq!(*category as usize, i);
            assert_eq!(category.as_str(), *name);
        }
    }

    #[test]
    fn parses_multi_word_names() {
        assert_eq!(
            "pc accessories".parse::<ListingCategory>().unwrap(),
            ListingCategory::PcAccessories
        );
        assert_eq!(
            "men's shoes".parse::<ListingCategory>().unwrap(),
            ListingCategory::MensShoes
        );
    }

    #[test]
    fn serde_names_match_the_table() {
        for (category, name) in CATEGORIES.iter() {
            assert_eq!(serde_json::to_value(category).unwrap(), *name);
        }
    }

    #[test]
    fn serde_uses_display_names() {
        let json = serde_json::to_string(&ListingCategory::SmartWatches).unwrap();
        assert_eq!(json, r#""smart watches""#);
        let back: ListingCategory = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ListingCategory::SmartWatches);
    }

    #[test]
    fn rejects_unknown_names() {
        let err = serde_json::from_str::<ListingCategory>(r#""spaceships""#).unwrap_err();
        assert!(err.to_string().contains("spaceships"));
    }
}
