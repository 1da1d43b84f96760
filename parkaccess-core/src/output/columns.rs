//! Attribute names made safe for tabular outputs

use hashbrown::HashSet;

use crate::model::Properties;

/// Lower-case a name and replace ` `, `:`, `-` and `/` with `_`
pub fn sanitize_column(name: &str) -> String {
    name.replace([' ', ':', '-', '/'], "_").to_lowercase()
}

/// Sanitise a list of names, suffixing repeats with `_1`, `_2`, ...
/// Names in `reserved` are treated as already taken.
pub fn sanitize_columns<'a, I>(names: I, reserved: &[&str]) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen: HashSet<String> = reserved.iter().map(|name| (*name).to_string()).collect();

    names
        .into_iter()
        .map(|name| {
            let name = sanitize_column(name);
            let unique = if seen.contains(&name) {
                let mut i = 1;
                let mut candidate = format!("{name}_{i}");
                while seen.contains(&candidate) {
                    i += 1;
                    candidate = format!("{name}_{i}");
                }
                candidate
            } else {
                name
            };
            seen.insert(unique.clone());
            unique
        })
        .collect()
}

/// Copy of `properties` with every key sanitised
pub fn sanitize_properties(properties: &Properties, reserved: &[&str]) -> Properties {
    let names = sanitize_columns(properties.keys().map(String::as_str), reserved);
    names
        .into_iter()
        .zip(properties.values().cloned())
        .collect()
}
