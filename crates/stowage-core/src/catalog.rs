//! Item-template catalog: identity string → immutable shape + display data.
//!
//! The engine only needs the bounding box and the optional shape bitmap;
//! display metadata is carried for the UI collaborator and never
//! interpreted here.

use std::collections::HashMap;
use std::fmt;

use hecs::{Entity, World};
use serde::{Deserialize, Serialize};

use crate::item::Item;
use crate::shape::{ShapeError, ShapeMask};

/// An immutable item definition. The four clockwise rotation masks are
/// derived once at construction; every instance stamped from the template
/// shares them.
#[derive(Clone, Debug)]
pub struct ItemTemplate {
    id: String,
    display_name: String,
    description: String,
    rotations: [ShapeMask; 4],
}

impl ItemTemplate {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>, mask: ShapeMask) -> Self {
        let r1 = mask.rotated_clockwise();
        let r2 = r1.rotated_clockwise();
        let r3 = r2.rotated_clockwise();
        Self {
            id: id.into(),
            display_name: display_name.into(),
            description: String::new(),
            rotations: [mask, r1, r2, r3],
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Unrotated occupancy mask.
    pub fn base_mask(&self) -> &ShapeMask {
        &self.rotations[0]
    }

    /// All four rotation masks, index = clockwise quarter turns.
    pub fn rotations(&self) -> &[ShapeMask; 4] {
        &self.rotations
    }
}

/// On-disk form of a template, as found in a JSON catalog file.
///
/// `cells` omitted or null means a plain solid rectangle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateSpec {
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub cells: Option<Vec<bool>>,
}

/// A template spec whose bitmap does not match its bounding box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadTemplate {
    pub id: String,
    pub error: ShapeError,
}

impl fmt::Display for BadTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "template '{}': {}", self.id, self.error)
    }
}

impl std::error::Error for BadTemplate {}

/// Registry of item templates keyed by identity string.
#[derive(Default, Clone, Debug)]
pub struct ItemCatalog {
    templates: HashMap<String, ItemTemplate>,
}

impl ItemCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from deserialized specs. Fails on the first spec
    /// whose bitmap length disagrees with its bounding box.
    pub fn from_specs(specs: impl IntoIterator<Item = TemplateSpec>) -> Result<Self, BadTemplate> {
        let mut catalog = Self::new();
        for spec in specs {
            let mask = match spec.cells {
                Some(cells) => ShapeMask::from_cells(spec.width, spec.height, cells).map_err(
                    |error| BadTemplate {
                        id: spec.id.clone(),
                        error,
                    },
                )?,
                None => ShapeMask::solid(spec.width, spec.height),
            };
            let display_name = if spec.display_name.is_empty() {
                spec.id.clone()
            } else {
                spec.display_name
            };
            catalog.register(
                ItemTemplate::new(spec.id, display_name, mask).with_description(spec.description),
            );
        }
        Ok(catalog)
    }

    /// Add or replace a template; returns the previous one for the same id.
    pub fn register(&mut self, template: ItemTemplate) -> Option<ItemTemplate> {
        self.templates.insert(template.id.clone(), template)
    }

    pub fn get(&self, id: &str) -> Option<&ItemTemplate> {
        self.templates.get(id)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    /// Spawn a fresh, unplaced item entity from the named template.
    pub fn spawn(&self, world: &mut World, id: &str) -> Option<Entity> {
        let template = self.templates.get(id)?;
        Some(world.spawn((Item::from_template(template),)))
    }
}
