//! Text rule parsing
//!
//! Grammar: `[!]<keyword> [argument]`. See [`Filter::parse`].

use super::{Filter, FilterTemplate, NumericRange};
use crate::beatmap::{GameMode, RankedStatus};
use crate::error::{Error, Result};

impl Filter {
    /// Parse a filter rule.
    ///
    /// | Rule                      | Matches                                   |
    /// |---------------------------|-------------------------------------------|
    /// | `stars 5-6.5`             | star rating in range                      |
    /// | `length 90+`              | drain length (seconds) in range           |
    /// | `bpm 180`                 | main BPM in range                         |
    /// | `mode taiko,mania`        | any listed game mode                      |
    /// | `status ranked,loved`     | any listed ranked status                  |
    /// | `artist camellia`         | artist contains text (romanized/unicode)  |
    /// | `title`, `mapper`, `tag`, `difficulty` | field contains text          |
    /// | `played` / `unplayed`     | difficulty has / has no scores            |
    /// | `collection #1,Favorites` | member of a listed collection             |
    ///
    /// A leading `!` negates the rule.
    pub fn parse(rule: &str) -> Result<Filter> {
        let description = rule.trim();
        let (negated, body) = match description.strip_prefix('!') {
            Some(rest) => (true, rest.trim_start()),
            None => (false, description),
        };

        let (keyword, argument) = match body.split_once(char::is_whitespace) {
            Some((k, a)) => (k, a.trim()),
            None => (body, ""),
        };
        let keyword = keyword.to_lowercase();

        let invalid = |reason: &str| Error::InvalidFilter {
            rule: description.to_string(),
            reason: reason.to_string(),
        };

        let filter = match keyword.as_str() {
            "stars" | "length" | "bpm" => {
                let range = NumericRange::parse(argument)
                    .ok_or_else(|| invalid("expected a range like 4-6, 5+ or 3"))?;
                numeric_filter(description, &keyword, range)
            }
            "mode" => {
                let modes = parse_list(argument, parse_mode)
                    .ok_or_else(|| invalid("expected osu, taiko, catch or mania"))?;
                Filter::new(description, FilterTemplate::Mode, move |b| {
                    modes.contains(&b.mode)
                })
            }
            "status" => {
                let statuses = parse_list(argument, parse_status)
                    .ok_or_else(|| invalid("unknown ranked status"))?;
                Filter::new(description, FilterTemplate::Status, move |b| {
                    b.ranked_status.map_or(false, |s| statuses.contains(&s))
                })
            }
            "artist" | "title" | "mapper" | "tag" | "difficulty" => {
                if argument.is_empty() {
                    return Err(invalid("expected text to search for"));
                }
                text_filter(description, &keyword, argument.to_lowercase())
            }
            "played" | "unplayed" => {
                if !argument.is_empty() {
                    return Err(invalid("takes no argument"));
                }
                let wanted = keyword == "played";
                Filter::new(description, FilterTemplate::Played, move |b| {
                    !b.scores.is_empty() == wanted
                })
            }
            "collection" => {
                let references: Vec<String> = argument
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect();
                if references.is_empty() {
                    return Err(invalid("expected a collection name, #id or -all"));
                }
                Filter::collections(description, references)
            }
            "" => return Err(invalid("empty rule")),
            _ => return Err(invalid("unknown filter keyword")),
        };

        Ok(filter.negated(negated))
    }
}

fn numeric_filter(description: &str, keyword: &str, range: NumericRange) -> Filter {
    match keyword {
        "stars" => Filter::new(description, FilterTemplate::StarRating, move |b| {
            b.star_rating.map_or(false, |sr| range.contains(sr as f64))
        }),
        "length" => Filter::new(description, FilterTemplate::Length, move |b| {
            range.contains(b.length_ms as f64 / 1000.0)
        }),
        _ => Filter::new(description, FilterTemplate::Bpm, move |b| range.contains(b.bpm)),
    }
}

fn text_filter(description: &str, keyword: &str, needle: String) -> Filter {
    match keyword {
        "artist" => Filter::new(description, FilterTemplate::Artist, move |b| {
            contains(&b.metadata.artist, &needle)
                || b.metadata
                    .artist_unicode
                    .as_deref()
                    .map_or(false, |a| contains(a, &needle))
        }),
        "title" => Filter::new(description, FilterTemplate::Title, move |b| {
            contains(&b.metadata.title, &needle)
                || b.metadata
                    .title_unicode
                    .as_deref()
                    .map_or(false, |t| contains(t, &needle))
        }),
        "mapper" => Filter::new(description, FilterTemplate::Mapper, move |b| {
            contains(&b.metadata.creator, &needle)
        }),
        "tag" => Filter::new(description, FilterTemplate::Tag, move |b| {
            contains(&b.metadata.tags, &needle)
        }),
        _ => Filter::new(description, FilterTemplate::Difficulty, move |b| {
            contains(&b.version, &needle)
        }),
    }
}

fn contains(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

fn parse_list<T>(argument: &str, parse: fn(&str) -> Option<T>) -> Option<Vec<T>> {
    let items: Option<Vec<T>> = argument
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(parse)
        .collect();
    items.filter(|items| !items.is_empty())
}

fn parse_mode(text: &str) -> Option<GameMode> {
    match text.to_lowercase().as_str() {
        "osu" | "std" | "standard" => Some(GameMode::Osu),
        "taiko" => Some(GameMode::Taiko),
        "catch" | "fruits" | "ctb" => Some(GameMode::Catch),
        "mania" => Some(GameMode::Mania),
        _ => None,
    }
}

fn parse_status(text: &str) -> Option<RankedStatus> {
    match text.to_lowercase().as_str() {
        "graveyard" => Some(RankedStatus::Graveyard),
        "wip" => Some(RankedStatus::Wip),
        "pending" => Some(RankedStatus::Pending),
        "ranked" => Some(RankedStatus::Ranked),
        "approved" => Some(RankedStatus::Approved),
        "qualified" => Some(RankedStatus::Qualified),
        "loved" => Some(RankedStatus::Loved),
        _ => None,
    }
}
