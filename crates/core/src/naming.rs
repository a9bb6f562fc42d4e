//! Naming helpers
//!
//! Case conversion and English inflection used to turn migration names and
//! column names into table names, class names and model names. Inflection
//! only ever touches the last underscore-separated word, so `blog_post`
//! becomes `blog_posts` and `user_profiles` stays as it is.

use heck::{ToPascalCase, ToSnakeCase};

/// Irregular singular/plural pairs
const IRREGULARS: &[(&str, &str)] = &[
    ("person", "people"),
    ("child", "children"),
    ("man", "men"),
    ("woman", "women"),
    ("foot", "feet"),
    ("tooth", "teeth"),
    ("goose", "geese"),
    ("mouse", "mice"),
];

/// Singulars ending in `ie`, whose plural would otherwise read as `-y` + `ies`
const IE_SINGULARS: &[&str] = &[
    "movie", "cookie", "rookie", "zombie", "calorie", "hoodie", "selfie", "brownie", "genie",
    "pie", "tie", "lie",
];

/// Convert a name to `snake_case` (e.g. "BlogPost" → "blog_post").
pub fn snake(name: &str) -> String {
    name.to_snake_case()
}

/// Convert a name to `PascalCase` (e.g. "create_posts_table" → "CreatePostsTable").
pub fn pascal(name: &str) -> String {
    name.to_pascal_case()
}

/// Pluralise the last word of a snake_case name. Words that already look
/// plural are returned unchanged.
pub fn pluralize(name: &str) -> String {
    map_last_word(&snake(name), |word| {
        if is_plural(word) {
            word.to_string()
        } else {
            plural_word(word)
        }
    })
}

/// Singularise the last word of a snake_case name.
pub fn singularize(name: &str) -> String {
    map_last_word(&snake(name), singular_word)
}

/// Migration class name (e.g. "create_posts_table" → "CreatePostsTable").
pub fn class_name(migration_name: &str) -> String {
    pascal(migration_name)
}

/// Model class name for a table (e.g. "blog_posts" → "BlogPost").
pub fn model_name(table: &str) -> String {
    pascal(&singularize(table))
}

/// Referenced table for a foreign-key column by convention
/// (e.g. "user_id" → "users", "author" → "authors").
pub fn foreign_table(column: &str) -> String {
    let column = snake(column);
    let base = column.strip_suffix("_id").unwrap_or(&column);
    pluralize(base)
}

fn map_last_word(name: &str, f: impl Fn(&str) -> String) -> String {
    match name.rsplit_once('_') {
        Some((head, last)) => format!("{}_{}", head, f(last)),
        None => f(name),
    }
}

fn is_plural(word: &str) -> bool {
    singular_word(word) != word
}

fn plural_word(s: &str) -> String {
    if s.is_empty() {
        return String::new();
    }

    if let Some((_, plural)) = IRREGULARS.iter().find(|(singular, _)| *singular == s) {
        return plural.to_string();
    }

    // Handle words ending in 's', 'x', 'z', 'ch', 'sh'
    if s.ends_with('s')
        || s.ends_with('x')
        || s.ends_with('z')
        || s.ends_with("ch")
        || s.ends_with("sh")
    {
        return format!("{}es", s);
    }

    // Handle words ending in consonant + 'y'
    if let Some(stem) = s.strip_suffix('y') {
        if stem.chars().last().is_some_and(|c| !"aeiou".contains(c)) {
            return format!("{}ies", stem);
        }
    }

    if let Some(stem) = s.strip_suffix("fe") {
        return format!("{}ves", stem);
    }

    format!("{}s", s)
}

fn singular_word(s: &str) -> String {
    if let Some((singular, _)) = IRREGULARS.iter().find(|(_, plural)| *plural == s) {
        return singular.to_string();
    }
    if IRREGULARS.iter().any(|(singular, _)| *singular == s) {
        return s.to_string();
    }

    if let Some(singular) = s.strip_suffix('s').filter(|stem| IE_SINGULARS.contains(stem)) {
        return singular.to_string();
    }
    if let Some(stem) = s.strip_suffix("ies").filter(|stem| !stem.is_empty()) {
        return format!("{}y", stem);
    }

    for suffix in ["sses", "shes", "ches", "xes", "zes", "uses"] {
        if s.ends_with(suffix) {
            return s[..s.len() - 2].to_string();
        }
    }

    if s.ends_with("ss") || s.ends_with("us") || s.ends_with("is") {
        return s.to_string();
    }

    match s.strip_suffix('s') {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => s.to_string(),
    }
}

// ============================================================================
// Tests
// ============================================================================
