use std::collections::BTreeSet;
use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

static MAIN_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("main").unwrap());

/// Structural labels javadoc puts on the blocks of a class page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Header,
    Inheritance,
    ClassDescription,
    Summary,
    DetailsList,
    Notes,
    InheritedList,
}

impl Category {
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "header" => Some(Self::Header),
            "inheritance" => Some(Self::Inheritance),
            "class-description" => Some(Self::ClassDescription),
            "summary" => Some(Self::Summary),
            "details-list" => Some(Self::DetailsList),
            "notes" => Some(Self::Notes),
            "inherited-list" => Some(Self::InheritedList),
            _ => None,
        }
    }

    pub fn is_kept(self) -> bool {
        !self.is_dropped()
    }

    /// Dropped wherever it appears, including inside a kept block.
    pub fn is_dropped(self) -> bool {
        matches!(self, Self::Notes | Self::InheritedList)
    }
}

/// Categories named by an element's `class` attribute; unknown classes are ignored.
pub fn categories_of(element: &ElementRef) -> BTreeSet<Category> {
    element
        .value()
        .classes()
        .filter_map(Category::from_label)
        .collect()
}

/// True when one of the element's class names is a dropped label.
///
/// Class names are compared whole, not as substrings: `notes-extra` or
/// `inherited-list-item` do not count as `notes` / `inherited-list`.
pub fn is_dropped(element: &ElementRef) -> bool {
    element
        .value()
        .classes()
        .filter_map(Category::from_label)
        .any(Category::is_dropped)
}

/// A direct child of `<main>` and its categories.
#[derive(Debug, Clone)]
pub struct ContentBlock<'a> {
    pub element: ElementRef<'a>,
    pub categories: BTreeSet<Category>,
}

impl<'a> ContentBlock<'a> {
    pub fn new(element: ElementRef<'a>) -> Self {
        let categories = categories_of(&element);
        Self {
            element,
            categories,
        }
    }

    pub fn is_kept(&self) -> bool {
        self.categories.iter().any(|c| c.is_kept())
            && !self.categories.iter().any(|c| c.is_dropped())
    }
}

/// Top-level blocks of the page's `<main>`, or `None` if it has none.
pub fn main_blocks(document: &Html) -> Option<Vec<ContentBlock<'_>>> {
    let main = document.select(&MAIN_SELECTOR).next()?;
    Some(
        main.children()
            .filter_map(ElementRef::wrap)
            .map(ContentBlock::new)
            .collect(),
    )
}

// ── Tests ──
