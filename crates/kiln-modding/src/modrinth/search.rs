//! Search for projects

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::{Builder, QueryData};

#[derive(Debug, Serialize, Deserialize)]
pub struct Search {
    pub hits: Vec<Hit>,
    pub offset: u32,
    pub limit: u32,
    pub total_hits: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hit {
    pub project_id: String,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub categories: Vec<String>,
    pub project_type: String,
    #[serde(default)]
    pub downloads: u64,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub versions: Vec<String>,
    pub latest_version: Option<String>,
}

#[derive(TypedBuilder)]
pub struct SearchData {
    #[builder(default, setter(strip_option, into))]
    query: Option<String>,
    #[builder(default, setter(strip_option))]
    facets: Option<Facets>,
    /// Must be in the range 0..100
    #[builder(default, setter(strip_option))]
    limit: Option<u8>,
}

#[derive(Default, Clone, PartialEq, Eq, Debug)]
pub struct Facets {
    parts: Parts,
}

impl Facets {
    pub fn new(parts: Parts) -> Self {
        Self { parts }
    }

    /// Mods that run on `game_version`, optionally limited to one loader.
    pub fn mods_for(game_version: impl Into<String>, loader: Option<&str>) -> Self {
        let parts = Parts::new()
            .add_project_type("mod")
            .part(InnerPart::new().add_version(game_version));

        match loader {
            Some(loader) => Self::new(parts.part(InnerPart::new().add_category(loader))),
            None => Self::new(parts),
        }
    }

    pub fn build(&self) -> String {
        self.parts.build()
    }
}

/// Each [`InnerPart`] represents a statement that will be joined using `AND` operation.
/// Eg: `inner_part_1 AND inner_part_2` means that statement from `inner_part_1` and `inner_part_2`
/// must be satisfied.
///
/// Where items in [`InnerPart`] will be joined using `OR` operation.
#[derive(Default, Clone, PartialEq, Eq, Debug)]
pub struct Parts(Vec<InnerPart>);

impl Parts {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn part(mut self, part: InnerPart) -> Self {
        self.0.push(part);
        self
    }

    #[must_use]
    pub fn add_project_type(self, project_type: &str) -> Self {
        self.part(InnerPart::new().add_project_type(project_type))
    }

    pub fn build(&self) -> String {
        let iter = self.0.iter().map(InnerPart::build);
        let string = itertools::intersperse(iter, ",".to_owned()).collect::<String>();
        format!("[{string}]")
    }
}

/// All items inside will be joined using OR operation.
///
/// Eg: `["categories:fabric", "categories:quilt"]` mean that mod will be supported either by Fabric
/// or by Quilt.
#[derive(Default, Clone, PartialEq, Eq, Debug)]
pub struct InnerPart(Vec<String>);

impl InnerPart {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn add_project_type(mut self, project_type: &str) -> Self {
        self.0.push(format!("project_type:{project_type}"));
        self
    }

    #[must_use]
    pub fn add_category(mut self, category: impl Into<String>) -> Self {
        self.0.push(format!("categories:{}", category.into()));
        self
    }

    #[must_use]
    pub fn add_version(mut self, version: impl Into<String>) -> Self {
        self.0.push(format!("versions:{}", version.into()));
        self
    }

    pub fn build(&self) -> String {
        crate::format_list(self.0.iter().map(String::as_str))
    }
}

impl QueryData<Search> for SearchData {
    fn builder(&self, base_url: &str) -> Builder {
        Builder::new(format!("{base_url}/search"))
            .add_optional_parameter("query", self.query.as_ref())
            .add_optional_parameter("facets", self.facets.as_ref().map(Facets::build))
            .add_optional_parameter("limit", self.limit.map(|l| l.to_string()))
    }
}
