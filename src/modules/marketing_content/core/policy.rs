// SEO score for a piece of marketing content, 0 to 100.
//
// The weights and thresholds are editorial policy owned by the marketing team; change
// them here only.

use crate::modules::marketing_content::core::content::MarketingContent;
use serde::Serialize;

pub const SEO_TITLE_LENGTH: std::ops::RangeInclusive<usize> = 30..=60;
pub const SEO_TITLE_POINTS: u32 = 25;

pub const META_DESCRIPTION_LENGTH: std::ops::RangeInclusive<usize> = 120..=160;
pub const META_DESCRIPTION_POINTS: u32 = 25;

pub const MIN_KEYWORDS: usize = 3;
pub const KEYWORDS_POINTS: u32 = 15;

pub const MIN_BODY_WORDS: usize = 300;
pub const BODY_LENGTH_POINTS: u32 = 20;

pub const KEYWORD_IN_TITLE_POINTS: u32 = 15;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeoCheck {
    pub name: &'static str,
    pub passed: bool,
    pub points: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeoScore {
    pub total: u32,
    pub checks: Vec<SeoCheck>,
}

fn check(name: &'static str, passed: bool, points: u32) -> SeoCheck {
    SeoCheck {
        name,
        passed,
        points: if passed { points } else { 0 },
    }
}

pub fn seo_score(content: &MarketingContent) -> SeoScore {
    let title = content
        .seo_title
        .as_deref()
        .filter(|title| !title.trim().is_empty())
        .unwrap_or(&content.title);
    let title_lower = title.to_lowercase();
    let meta_length = content
        .meta_description
        .as_deref()
        .map_or(0, |meta| meta.trim().chars().count());
    let keywords: Vec<&str> = content
        .keywords
        .iter()
        .map(|keyword| keyword.trim())
        .filter(|keyword| !keyword.is_empty())
        .collect();

    let checks = vec![
        check(
            "seo_title_length",
            SEO_TITLE_LENGTH.contains(&title.trim().chars().count()),
            SEO_TITLE_POINTS,
        ),
        check(
            "meta_description_length",
            META_DESCRIPTION_LENGTH.contains(&meta_length),
            META_DESCRIPTION_POINTS,
        ),
        check("keyword_count", keywords.len() >= MIN_KEYWORDS, KEYWORDS_POINTS),
        check(
            "body_length",
            content.content.split_whitespace().count() >= MIN_BODY_WORDS,
            BODY_LENGTH_POINTS,
        ),
        check(
            "keyword_in_title",
            keywords
                .iter()
                .any(|keyword| title_lower.contains(&keyword.to_lowercase())),
            KEYWORD_IN_TITLE_POINTS,
        ),
    ];
    SeoScore {
        total: checks.iter().map(|check| check.points).sum(),
        checks,
    }
}
