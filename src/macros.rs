/// Field selection of identifiable objects: `id,code,name,created,lastUpdated`.
#[macro_export]
macro_rules! id_fields {
    () => {
        "id,code,name,created,lastUpdated"
    };
}

/// Field selection of nameable objects, [`id_fields!`] plus short name and description.
#[macro_export]
macro_rules! name_fields {
    () => {
        concat!($crate::id_fields!(), ",shortName,description")
    };
}

/// Joins field selection fragments with commas at compile time.
///
/// ```
/// use dhis2::{fields, name_fields};
///
/// const DATA_ELEMENT: &str = fields!(name_fields!(), "valueType", "legendSets[id,name]");
///
/// assert_eq!(
///     DATA_ELEMENT,
///     "id,code,name,created,lastUpdated,shortName,description,valueType,legendSets[id,name]"
/// );
/// ```
#[macro_export]
macro_rules! fields {
    ($first:expr $(, $rest:expr)* $(,)?) => {
        concat!($first $(, ",", $rest)*)
    };
}

/// Wraps a field selection as the nested selection of `property`,
/// e.g. `parent[id,name]`.
#[macro_export]
macro_rules! nested_fields {
    ($property:literal, $inner:expr) => {
        concat!($property, "[", $inner, "]")
    };
}
