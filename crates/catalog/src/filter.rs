use crate::{LocationCatalog, MAX_LEVEL, MIN_LEVEL, Product};

/// A filter dimension: either everything, or one specific value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum FilterChoice<T> {
    #[default]
    All,
    Only(T),
}

impl<T: PartialEq> FilterChoice<T> {
    pub fn accepts(&self, value: &T) -> bool {
        match self {
            FilterChoice::All => true,
            FilterChoice::Only(v) => v == value,
        }
    }
}

/// A labelled filter value, ready to feed a selector widget.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOption<T> {
    pub label: String,
    pub value: FilterChoice<T>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProductFilter {
    /// Matched against the location *name*, as the filter list shows names.
    pub location: FilterChoice<String>,
    pub level: FilterChoice<u8>,
}

/// A product together with the name of the location that sells it.
#[derive(Debug, Clone, PartialEq)]
pub struct ListedProduct<'a> {
    pub product: &'a Product,
    pub location_name: &'a str,
}

impl LocationCatalog {
    /// All products passing `filter`, in catalog order.
    pub fn filter_products(&self, filter: &ProductFilter) -> Vec<ListedProduct<'_>> {
        self.iter()
            .filter(|e| filter.location.accepts(&e.location.name))
            .flat_map(|e| {
                e.location.products.iter().map(move |product| ListedProduct {
                    product,
                    location_name: e.location.name.as_str(),
                })
            })
            .filter(|listed| filter.level.accepts(&listed.product.level))
            .collect()
    }

    /// "All Locations" followed by every location name.
    pub fn location_filter_options(&self) -> Vec<FilterOption<String>> {
        std::iter::once(FilterOption {
            label: "All Locations".to_string(),
            value: FilterChoice::All,
        })
        .chain(self.iter().map(|e| FilterOption {
            label: e.location.name.clone(),
            value: FilterChoice::Only(e.location.name.clone()),
        }))
        .collect()
    }
}

/// "All Levels" followed by each product level.
pub fn level_filter_options() -> Vec<FilterOption<u8>> {
    std::iter::once(FilterOption {
        label: "All Levels".to_string(),
        value: FilterChoice::All,
    })
    .chain((MIN_LEVEL..=MAX_LEVEL).map(|level| FilterOption {
        label: format!("Level {level}"),
        value: FilterChoice::Only(level),
    }))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::{FilterChoice, ProductFilter, level_filter_options};
    use crate::LocationCatalog;
    use pretty_assertions::assert_eq;

    fn ids(catalog: &LocationCatalog, filter: &ProductFilter) -> Vec<String> {
        catalog
            .filter_products(filter)
            .iter()
            .map(|l| l.product.id.clone())
            .collect()
    }

    #[test]
    fn unfiltered_lists_everything_in_catalog_order() {
        let catalog = LocationCatalog::sample().unwrap();
        assert_eq!(
            ids(&catalog, &ProductFilter::default()),
            vec!["p1", "p2", "p5", "p3", "p4"]
        );
    }

    #[test]
    fn location_and_level_filters_combine() {
        let catalog = LocationCatalog::sample().unwrap();
        let by_location = ProductFilter {
            location: FilterChoice::Only("Sahara Outpost".to_string()),
            level: FilterChoice::All,
        };
        assert_eq!(ids(&catalog, &by_location), vec!["p2", "p5"]);

        let by_level = ProductFilter {
            location: FilterChoice::All,
            level: FilterChoice::Only(2),
        };
        assert_eq!(ids(&catalog, &by_level), vec!["p1", "p4"]);

        let none = ProductFilter {
            location: FilterChoice::Only("Sahara Outpost".to_string()),
            level: FilterChoice::Only(1),
        };
        assert!(catalog.filter_products(&none).is_empty());
    }

    #[test]
    fn listed_products_carry_location_name() {
        let catalog = LocationCatalog::sample().unwrap();
        let listed = catalog.filter_products(&ProductFilter::default());
        assert_eq!(listed[0].location_name, "Crystal Caves");
    }

    #[test]
    fn option_lists_start_with_all() {
        let catalog = LocationCatalog::sample().unwrap();
        let locations = catalog.location_filter_options();
        assert_eq!(locations.len(), 6);
        assert_eq!(locations[0].label, "All Locations");
        assert_eq!(locations[0].value, FilterChoice::All);
        assert_eq!(
            locations[4].value,
            FilterChoice::Only("Kyoto Village".to_string())
        );

        let labels: Vec<String> = level_filter_options().into_iter().map(|o| o.label).collect();
        assert_eq!(labels, vec!["All Levels", "Level 1", "Level 2", "Level 3"]);
    }
}
