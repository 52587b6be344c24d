//! Entity types of the Valar schema.
//!
//! Foreign keys are plain integer columns named after the referenced row (`supplier_id`).

use valar_fetch::{Column, EntityType, SqlType};

const fn id() -> Column {
   Column::new("id", SqlType::Integer).primary()
}

const fn created() -> Column {
   Column::new("created", SqlType::DateTime)
}

const fn name() -> Column {
   Column::new("name", SqlType::VarChar).unique()
}

pub static SUPPLIERS: EntityType = EntityType::new(
   "Suppliers",
   "suppliers",
   &[
      id(),
      created(),
      Column::new("description", SqlType::VarChar).nullable(),
      name(),
   ],
);

pub static PLATE_TYPES: EntityType = EntityType::new(
   "PlateTypes",
   "plate_types",
   &[
      id(),
      Column::new("n_columns", SqlType::Integer),
      Column::new("n_rows", SqlType::Integer),
      Column::new("name", SqlType::VarChar).nullable(),
      Column::new("opacity", SqlType::Enum).choices(&["opaque", "transparent"]),
      Column::new("part_number", SqlType::VarChar).nullable(),
      Column::new("supplier_id", SqlType::Integer).nullable(),
      Column::new("well_shape", SqlType::Enum).choices(&["round", "square", "rectangular"]),
   ],
);

pub static USERS: EntityType = EntityType::new(
   "Users",
   "users",
   &[
      id(),
      Column::new("bcrypt_hash", SqlType::VarChar).nullable(),
      created(),
      Column::new("first_name", SqlType::VarChar),
      Column::new("last_name", SqlType::VarChar),
      Column::new("username", SqlType::VarChar).unique(),
      Column::new("write_access", SqlType::TinyInt),
   ],
);

pub static PROJECT_TYPES: EntityType = EntityType::new(
   "ProjectTypes",
   "project_types",
   &[
      id(),
      Column::new("description", SqlType::Text),
      name(),
   ],
);

/// Called superprojects in the schema.
pub static PROJECTS: EntityType = EntityType::new(
   "Projects",
   "superprojects",
   &[
      id(),
      Column::new("active", SqlType::TinyInt),
      created(),
      Column::new("creator_id", SqlType::Integer),
      Column::new("description", SqlType::VarChar).nullable(),
      Column::new("methods", SqlType::Text).nullable(),
      name(),
      Column::new("reason", SqlType::Text).nullable(),
      Column::new("type_id", SqlType::Integer).nullable(),
   ],
);

pub static LOCATIONS: EntityType = EntityType::new(
   "Locations",
   "locations",
   &[
      id(),
      Column::new("active", SqlType::TinyInt),
      created(),
      Column::new("description", SqlType::VarChar),
      name(),
      Column::new("part_of", SqlType::Integer).nullable(),
      Column::new("purpose", SqlType::VarChar),
      Column::new("temporary", SqlType::TinyInt),
   ],
);

pub static REFS: EntityType = EntityType::with_short_prefix(
   "Refs",
   "refs",
   &[
      id(),
      created(),
      Column::new("datetime_downloaded", SqlType::DateTime).nullable(),
      Column::new("description", SqlType::VarChar).nullable(),
      Column::new("external_version", SqlType::VarChar).nullable(),
      name(),
      Column::new("url", SqlType::VarChar).nullable(),
   ],
   "ref.",
);

pub static COMPOUNDS: EntityType = EntityType::new(
   "Compounds",
   "compounds",
   &[
      id(),
      Column::new("chembl_id", SqlType::VarChar).nullable(),
      Column::new("chemspider_id", SqlType::Integer).nullable(),
      created(),
      Column::new("inchi", SqlType::VarChar).length(2000),
      Column::new("inchikey", SqlType::Char).length(27).unique(),
      Column::new("inchikey_connectivity", SqlType::Char).length(14),
      Column::new("smiles", SqlType::VarChar).length(2000).nullable(),
   ],
);

pub static BATCHES: EntityType = EntityType::new(
   "Batches",
   "batches",
   &[
      id(),
      Column::new("amount", SqlType::VarChar).nullable(),
      Column::new("box_number", SqlType::SmallInt).nullable(),
      Column::new("compound_id", SqlType::Integer).nullable(),
      Column::new("concentration_millimolar", SqlType::Double).nullable(),
      created(),
      Column::new("date_ordered", SqlType::Date).nullable(),
      Column::new("legacy_internal_id", SqlType::VarChar).nullable(),
      Column::new("location_id", SqlType::SmallInt).nullable(),
      Column::new("location_note", SqlType::VarChar).nullable(),
      Column::new("lookup_hash", SqlType::VarChar).length(14).unique(),
      Column::new("made_from_id", SqlType::Integer).nullable(),
      Column::new("molecular_weight", SqlType::Double).nullable(),
      Column::new("notes", SqlType::Text).nullable(),
      Column::new("person_ordered", SqlType::SmallInt).nullable(),
      Column::new("ref_id", SqlType::SmallInt).nullable(),
      Column::new("solvent_id", SqlType::Integer).nullable(),
      Column::new("supplier_catalog_number", SqlType::VarChar).length(20).nullable(),
      Column::new("supplier_id", SqlType::SmallInt).nullable(),
      Column::new("suspicious", SqlType::TinyInt),
      Column::new("tag", SqlType::VarChar).length(100).unique().nullable(),
      Column::new("well_number", SqlType::SmallInt).nullable(),
   ],
);

/// Genes have no unique name; they can only be fetched by id.
pub static GENES: EntityType = EntityType::new(
   "Genes",
   "genes",
   &[
      id(),
      created(),
      Column::new("description", SqlType::VarChar).nullable(),
      Column::new("name", SqlType::VarChar).nullable(),
      Column::new("pub_link", SqlType::VarChar).nullable(),
      Column::new("raw_file", SqlType::Blob).nullable(),
      Column::new("raw_file_sha1", SqlType::Binary).length(20).nullable(),
      Column::new("ref_id", SqlType::SmallInt),
      Column::new("user_id", SqlType::SmallInt),
   ],
);

pub static BIOMARKERS: EntityType = EntityType::with_short_prefix(
   "Biomarkers",
   "biomarkers",
   &[
      id(),
      Column::new("is_gene_id", SqlType::Integer).nullable(),
      Column::new("name", SqlType::VarChar),
      Column::new("ref_id", SqlType::SmallInt),
   ],
   "bm.",
);

/// Every entity type declared here.
pub static ALL: [&EntityType; 11] = [
   &SUPPLIERS,
   &PLATE_TYPES,
   &USERS,
   &PROJECT_TYPES,
   &PROJECTS,
   &LOCATIONS,
   &REFS,
   &COMPOUNDS,
   &BATCHES,
   &GENES,
   &BIOMARKERS,
];

/// Look up a declared entity type by its name (`"Users"`) or table (`"users"`).
pub fn entity_type(name: &str) -> Option<&'static EntityType> {
   ALL.iter()
      .copied()
      .find(|e| e.name() == name || e.table() == name)
}
