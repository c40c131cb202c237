//! Catalog - entity metadata (entities, properties, types)
//!
//! The catalog describes the shape of the entities a backend can scan.
//! The planner never consults it; backends use it to bind property
//! references to row positions and to validate inserted rows.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

/// Value types understood by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// Boolean (true/false)
    Boolean,
    /// 32-bit signed integer
    Int,
    /// 64-bit signed integer
    BigInt,
    /// 64-bit floating point
    Double,
    /// Unlimited text
    Text,
    /// 128-bit identifier
    Uuid,
    /// Timestamp as unix milliseconds
    Timestamp,
}

impl DataType {
    /// Check if this type is an integer
    pub fn is_integer(&self) -> bool {
        matches!(self, DataType::Int | DataType::BigInt)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Boolean => "boolean",
            DataType::Int => "int",
            DataType::BigInt => "bigint",
            DataType::Double => "double",
            DataType::Text => "text",
            DataType::Uuid => "uuid",
            DataType::Timestamp => "timestamp",
        };
        f.write_str(name)
    }
}

/// Catalog errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("entity '{0}' already exists")]
    EntityExists(String),

    #[error("entity '{0}' declares property '{1}' twice")]
    DuplicateProperty(String, String),

    #[error("entity '{0}' has no id property '{1}'")]
    MissingId(String, String),
}

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Property definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDef {
    /// Property name
    pub name: String,
    /// Data type
    pub data_type: DataType,
    /// Whether NULL values are allowed
    pub nullable: bool,
}

impl PropertyDef {
    /// Create a new nullable property definition
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: true,
        }
    }

    /// Set nullable
    #[must_use]
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }
}

/// Entity definition
#[derive(Debug, Clone)]
pub struct EntityDef {
    /// Entity name
    pub name: String,
    /// Name of the identifier property
    pub id: Option<String>,
    /// Property definitions in storage order
    pub properties: Vec<PropertyDef>,
}

impl EntityDef {
    /// Create a new entity definition
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            properties: Vec::new(),
        }
    }

    /// Add the identifier property (never nullable)
    #[must_use]
    pub fn id(mut self, name: impl Into<String>, data_type: DataType) -> Self {
        let name = name.into();
        self.id = Some(name.clone());
        self.properties
            .push(PropertyDef::new(name, data_type).nullable(false));
        self
    }

    /// Add a property
    #[must_use]
    pub fn property(mut self, prop: PropertyDef) -> Self {
        self.properties.push(prop);
        self
    }

    /// Get property by name
    pub fn get_property(&self, name: &str) -> Option<&PropertyDef> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Get property index by name
    pub fn get_property_index(&self, name: &str) -> Option<usize> {
        self.properties.iter().position(|p| p.name == name)
    }

    fn validate(&self) -> CatalogResult<()> {
        for (i, prop) in self.properties.iter().enumerate() {
            if self.properties[..i].iter().any(|p| p.name == prop.name) {
                return Err(CatalogError::DuplicateProperty(
                    self.name.clone(),
                    prop.name.clone(),
                ));
            }
        }
        if let Some(id) = &self.id {
            if self.get_property(id).is_none() {
                return Err(CatalogError::MissingId(self.name.clone(), id.clone()));
            }
        }
        Ok(())
    }
}

/// Registry of entity definitions
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entities: HashMap<String, EntityDef>,
}

impl Catalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity
    pub fn create_entity(&mut self, entity: EntityDef) -> CatalogResult<()> {
        if self.entities.contains_key(&entity.name) {
            return Err(CatalogError::EntityExists(entity.name));
        }
        entity.validate()?;
        self.entities.insert(entity.name.clone(), entity);
        Ok(())
    }

    /// Look up an entity by name
    pub fn get_entity(&self, name: &str) -> Option<&EntityDef> {
        self.entities.get(name)
    }
}
