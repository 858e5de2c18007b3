use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub priority: u32,
}

/// Starter set seeded into a fresh store.
pub fn default_set() -> Vec<Category> {
    [
        ("Articles", 1),
        ("Research", 2),
        ("Work", 3),
        ("Personal", 4),
    ]
    .into_iter()
    .map(|(name, priority)| Category {
        name: name.to_string(),
        priority,
    })
    .collect()
}

/// Fold a candidate category name back into the set.
///
/// An exact name match leaves the set untouched; matching is
/// case-sensitive, so "articles" and "Articles" are distinct. A new name is
/// appended with priority max+1 and the set is re-sorted ascending.
/// Idempotent.
pub fn reconcile(mut categories: Vec<Category>, candidate: &str) -> Vec<Category> {
    if candidate.is_empty() || categories.iter().any(|c| c.name == candidate) {
        return categories;
    }
    let max = categories.iter().map(|c| c.priority).max().unwrap_or(0);
    categories.push(Category {
        name: candidate.to_string(),
        priority: max + 1,
    });
    categories.sort_by_key(|c| c.priority);
    categories
}

/// Display-ordered names (priority ascending); the shape fed into prompts.
pub fn sorted_names(categories: &[Category]) -> Vec<String> {
    let mut sorted: Vec<&Category> = categories.iter().collect();
    sorted.sort_by_key(|c| c.priority);
    sorted.into_iter().map(|c| c.name.clone()).collect()
}

/// Persisted category lists from older installs are bare string arrays.
/// Accept both shapes, upgrading strings to `{name, priority = index + 1}`.
pub fn deserialize_list<'de, D>(deserializer: D) -> Result<Vec<Category>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Legacy(String),
        Current(Category),
    }

    let raw = Vec::<Repr>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .enumerate()
        .map(|(index, repr)| match repr {
            Repr::Legacy(name) => Category {
                name,
                priority: index as u32 + 1,
            },
            Repr::Current(category) => category,
        })
        .collect())
}
