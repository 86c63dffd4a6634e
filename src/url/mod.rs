//! Address handling for wikirank
//!
//! This module converts between wiki addresses and page names, and reduces a
//! page path to the category segment the crawl index keys pages by.

mod normalize;

pub use normalize::LinkNormalizer;

/// Known namespace segments and their priority, in tie-break order
///
/// `main` is the generic bucket and loses to every standard namespace.
const SEGMENT_PRIORITIES: &[(&str, i32)] = &[
    ("main", -1),
    ("series", 0),
    ("film", 0),
    ("literature", 0),
    ("manga", 0),
    ("anime", 0),
    ("ymmv", 0),
    ("comicstrip", 0),
    ("franchise", 0),
    ("creator", 0),
    ("fanfic", 0),
    ("comicbook", 0),
    ("theatre", 0),
    ("videogame", 0),
    ("visualnovel", 0),
    ("webcomic", 0),
    ("webanimation", 0),
    ("roleplay", 0),
    ("westernanimation", 0),
    ("disney", 0),
    ("administrivia", 0),
    ("usefulnotes", 0),
    ("wrestling", 0),
    ("music", 0),
    ("website", 0),
    ("soyouwantto", 0),
    ("darthwiki", 0),
    ("analysis", 0),
    ("heavymetal", 0),
    ("tropers", 0),
];

/// Segments starting with this pattern rank above standard namespaces
const TROPES_PATTERN: &str = "tropes";
const TROPES_PRIORITY: i32 = 5;

/// Priority of any segment not matched otherwise
const CATCH_ALL_PRIORITY: i32 = 10;

/// Scores a single path segment
///
/// Returns the priority and the position used to break ties (lower wins).
/// Segments outside the table share the last tie-break position.
pub fn segment_priority(segment: &str) -> (i32, usize) {
    let lowered = segment.to_lowercase();

    if let Some(position) = SEGMENT_PRIORITIES
        .iter()
        .position(|(name, _)| *name == lowered)
    {
        return (SEGMENT_PRIORITIES[position].1, position);
    }

    let priority = if lowered.starts_with(TROPES_PATTERN) {
        TROPES_PRIORITY
    } else {
        CATCH_ALL_PRIORITY
    };

    (priority, SEGMENT_PRIORITIES.len())
}

/// Reduces a slash-delimited page path to its highest-priority segment
///
/// Ties go to the segment defined earlier in the priority table, then to the
/// segment appearing earlier in the path. The segment keeps its casing.
///
/// # Examples
///
/// ```
/// use wikirank::url::classify_path;
///
/// assert_eq!(classify_path("Main/GameOfThrones"), "GameOfThrones");
/// assert_eq!(classify_path("Series/Film"), "Series");
/// assert_eq!(classify_path("Main"), "Main");
/// ```
pub fn classify_path(path: &str) -> &str {
    let mut best: Option<(&str, i32, usize)> = None;

    for segment in path.split('/') {
        let (priority, position) = segment_priority(segment);
        let better = match best {
            None => true,
            Some((_, best_priority, best_position)) => {
                priority > best_priority
                    || (priority == best_priority && position < best_position)
            }
        };
        if better {
            best = Some((segment, priority, position));
        }
    }

    best.map(|(segment, _, _)| segment).unwrap_or(path)
}
