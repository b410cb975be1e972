//! Response normalization
//!
//! Turns a provider's raw payload into canonical [`ImageResult`]s. Structured
//! (JSON) payloads are read field by field with every field optional.
//! Unstructured payloads go through a fixed list of parse strategies: strict
//! RSS item extraction first, then a pattern scan over the raw markup.
//!
//! Nothing in here fails. Sparse or unrecognized input yields fewer (or zero)
//! results, never an error.

use crate::search::types::{ImageResult, ImageSource, Tags};
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::sync::OnceLock;

pub const TITLE_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MAX_CHARS: usize = 200;
const ELLIPSIS: &str = "...";

const FASHION_KEYWORDS: &[&str] = &[
    "dress", "outfit", "style", "fashion", "clothing", "wear", "apparel", "gown", "suit", "shirt",
    "pants", "skirt", "blouse", "jacket", "casual", "formal", "elegant", "trendy", "modern",
    "classic", "wedding", "party", "business", "evening", "summer", "winter",
];

/// Raw body handed back by a provider adapter
#[derive(Debug, Clone, PartialEq)]
pub enum RawPayload {
    Json(Value),
    /// RSS/XML document or HTML page
    Markup(String),
}

/// Outcome of one parse strategy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome<T> {
    Parsed(Vec<T>),
    NotRecognized,
}

impl<T> ParseOutcome<T> {
    fn from_records(records: Vec<T>) -> Self {
        if records.is_empty() {
            ParseOutcome::NotRecognized
        } else {
            ParseOutcome::Parsed(records)
        }
    }
}

/// A pin pulled out of scraped markup, before normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapedPin {
    pub pin_id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub link: String,
}

type PinStrategy = fn(&str) -> ParseOutcome<ScrapedPin>;

/// Strategies tried, in order, on unstructured documents
const PIN_STRATEGIES: &[(&str, PinStrategy)] = &[("rss", parse_rss_items), ("html", scan_pin_links)];

/// Normalize a raw payload from `source` into canonical results.
///
/// `offset` is the absolute position of the first result on this page and is
/// used to keep generated ids unique across pages.
pub fn normalize(raw: &RawPayload, source: ImageSource, query: &str, offset: usize) -> Vec<ImageResult> {
    match raw {
        RawPayload::Json(value) => normalize_json(value, source, query, offset),
        RawPayload::Markup(text) => {
            let pins = extract_pins(text);
            pins.into_iter()
                .enumerate()
                .map(|(i, pin)| pin_to_result(pin, source, query, offset + i))
                .collect()
        }
    }
}

/// Total match count reported in a structured payload, if any
pub fn reported_total(raw: &RawPayload) -> Option<u64> {
    let RawPayload::Json(value) = raw else {
        return None;
    };
    let total = &value["searchInformation"]["totalResults"];
    total
        .as_u64()
        .or_else(|| total.as_str().and_then(|s| s.trim().parse::<u64>().ok()))
        .filter(|n| *n > 0)
}

/// Run the pin strategies in order and return the first non-empty result,
/// deduplicated by pin id.
pub fn extract_pins(text: &str) -> Vec<ScrapedPin> {
    for (name, strategy) in PIN_STRATEGIES {
        match strategy(text) {
            ParseOutcome::Parsed(pins) => {
                tracing::debug!(strategy = *name, pin_count = pins.len(), "markup parsed");
                let mut seen = HashSet::new();
                return pins
                    .into_iter()
                    .filter(|p| seen.insert(p.pin_id.clone()))
                    .collect();
            }
            ParseOutcome::NotRecognized => {
                tracing::trace!(strategy = *name, "markup not recognized");
            }
        }
    }
    Vec::new()
}

fn normalize_json(value: &Value, source: ImageSource, query: &str, offset: usize) -> Vec<ImageResult> {
    let Some(items) = value["items"].as_array() else {
        return Vec::new();
    };

    items
        .iter()
        .enumerate()
        .filter_map(|(i, item)| json_item_to_result(item, source, query, offset + i + 1))
        .collect()
}

fn json_item_to_result(item: &Value, source: ImageSource, query: &str, position: usize) -> Option<ImageResult> {
    let link = non_empty(item["link"].as_str())?;
    let image = &item["image"];

    let native_id = non_empty(item["cacheId"].as_str())
        .map(str::to_string)
        .unwrap_or_else(|| short_hash(link));
    let id = format!("{}-{}-{}", source, native_id, position);

    let raw_title = item["title"].as_str().unwrap_or_default();
    let raw_snippet = item["snippet"].as_str().unwrap_or_default();

    let title = Some(sanitize_text(raw_title, TITLE_MAX_CHARS))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| format!("{} Fashion Style {}", query, position));

    let mut result = ImageResult::new(id, title, link, source);
    result.description = Some(sanitize_text(raw_snippet, DESCRIPTION_MAX_CHARS))
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| format!("Fashion inspiration for {}", query));

    if let Some(thumb) = non_empty(image["thumbnailLink"].as_str()) {
        result.thumbnail_url = thumb.to_string();
    }
    if let Some(w) = positive_dimension(&image["width"]) {
        result.width = w;
    }
    if let Some(h) = positive_dimension(&image["height"]) {
        result.height = h;
    }

    let context_link = non_empty(image["contextLink"].as_str()).map(str::to_string);
    result.photographer = Some(
        context_link
            .as_deref()
            .and_then(extract_domain)
            .unwrap_or_else(|| "Google Images".to_string()),
    );
    result.context_link = context_link;
    result.display_link = non_empty(item["displayLink"].as_str()).map(str::to_string);
    result.file_format = Some(
        non_empty(item["fileFormat"].as_str())
            .unwrap_or("image")
            .to_string(),
    );
    result.byte_size = image["byteSize"]
        .as_u64()
        .or_else(|| image["byteSize"].as_str().and_then(|s| s.parse().ok()));
    result.category = Some("Fashion Inspiration".to_string());
    result.tags = extract_tags(source, query, raw_title, raw_snippet);

    Some(result)
}

fn pin_to_result(pin: ScrapedPin, source: ImageSource, query: &str, index: usize) -> ImageResult {
    let title = pin
        .title
        .as_deref()
        .map(|t| sanitize_text(t, TITLE_MAX_CHARS))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| format!("Fashion Style {}", index + 1));
    let description = pin
        .description
        .as_deref()
        .map(|d| sanitize_text(d, DESCRIPTION_MAX_CHARS))
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| "Fashion inspiration from Pinterest".to_string());

    let mut result = ImageResult::new(
        format!("{}-{}", source, pin.pin_id),
        title,
        pin_image_url(&pin.pin_id, "736x"),
        source,
    );
    result.thumbnail_url = pin_image_url(&pin.pin_id, "236x");
    result.tags = extract_tags(
        source,
        query,
        pin.title.as_deref().unwrap_or_default(),
        pin.description.as_deref().unwrap_or_default(),
    );
    result.description = description;
    result.category = Some("Pinterest Fashion".to_string());
    result.original_link = Some(pin.link);
    result
}

/// Pinterest CDN URL for a pin at a given size bucket (`236x`, `564x`, `736x`, `originals`)
pub fn pin_image_url(pin_id: &str, size: &str) -> String {
    format!("https://i.pinimg.com/{}/{}.jpg", size, pin_id)
}

/// Strict parse: RSS `<item>` elements whose link points at a pin
pub fn parse_rss_items(text: &str) -> ParseOutcome<ScrapedPin> {
    #[derive(Default)]
    struct Item {
        title: String,
        link: String,
        description: String,
    }

    #[derive(Clone, Copy, PartialEq)]
    enum Field {
        Title,
        Link,
        Description,
    }

    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut items = Vec::new();
    let mut current: Option<Item> = None;
    let mut field: Option<Field> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"item" => current = Some(Item::default()),
                b"title" if current.is_some() => field = Some(Field::Title),
                b"link" if current.is_some() => field = Some(Field::Link),
                b"description" if current.is_some() => field = Some(Field::Description),
                _ => {}
            },
            Ok(Event::Text(t)) => {
                if let (Some(item), Some(f)) = (current.as_mut(), field) {
                    let text = t.unescape().map(|c| c.into_owned()).unwrap_or_default();
                    push_field(item_field(item, f), &text);
                }
            }
            Ok(Event::CData(t)) => {
                if let (Some(item), Some(f)) = (current.as_mut(), field) {
                    let text = String::from_utf8_lossy(&t.into_inner()).into_owned();
                    push_field(item_field(item, f), &text);
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"item" => {
                    if let Some(item) = current.take() {
                        items.push(item);
                    }
                    field = None;
                }
                b"title" | b"link" | b"description" => field = None,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                tracing::trace!(error = %e, "document is not well-formed xml");
                return ParseOutcome::NotRecognized;
            }
            _ => {}
        }
    }

    fn item_field(item: &mut Item, f: Field) -> &mut String {
        match f {
            Field::Title => &mut item.title,
            Field::Link => &mut item.link,
            Field::Description => &mut item.description,
        }
    }

    fn push_field(target: &mut String, text: &str) {
        if !target.is_empty() {
            target.push(' ');
        }
        target.push_str(text);
    }

    let pins = items
        .into_iter()
        .filter_map(|item| {
            let link = item.link.trim().to_string();
            let pin_id = extract_pin_id(&link)?;
            Some(ScrapedPin {
                pin_id,
                title: non_empty(Some(item.title.trim())).map(str::to_string),
                description: non_empty(Some(item.description.trim())).map(str::to_string),
                link,
            })
        })
        .collect();

    ParseOutcome::from_records(pins)
}

/// Pattern fallback: scan raw markup for pin URLs, pairing `"title":"..."`
/// tokens with pins by position
pub fn scan_pin_links(text: &str) -> ParseOutcome<ScrapedPin> {
    static PIN_URL: OnceLock<Regex> = OnceLock::new();
    static TITLE_TOKEN: OnceLock<Regex> = OnceLock::new();
    static UNICODE_ESCAPE: OnceLock<Regex> = OnceLock::new();

    let pin_url = PIN_URL.get_or_init(|| {
        Regex::new(r"https://www\.pinterest\.com/pin/(\d+)").expect("valid pin url regex")
    });
    let title_token = TITLE_TOKEN
        .get_or_init(|| Regex::new(r#""title":"([^"]+)""#).expect("valid title regex"));
    let unicode_escape = UNICODE_ESCAPE
        .get_or_init(|| Regex::new(r"(?i)\\u[0-9a-f]{4}").expect("valid escape regex"));

    let mut seen = HashSet::new();
    let ids: Vec<&str> = pin_url
        .captures_iter(text)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .filter(|id| seen.insert(*id))
        .collect();

    let titles: Vec<String> = title_token
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| unicode_escape.replace_all(m.as_str(), "").trim().to_string())
        .collect();

    let pins = ids
        .into_iter()
        .enumerate()
        .map(|(i, id)| ScrapedPin {
            pin_id: id.to_string(),
            title: titles.get(i).filter(|t| !t.is_empty()).cloned(),
            description: None,
            link: format!("https://www.pinterest.com/pin/{}", id),
        })
        .collect();

    ParseOutcome::from_records(pins)
}

/// Pin id from a `/pin/<digits>` link
pub fn extract_pin_id(link: &str) -> Option<String> {
    static PIN_PATH: OnceLock<Regex> = OnceLock::new();
    let re = PIN_PATH.get_or_init(|| Regex::new(r"/pin/(\d+)").expect("valid pin path regex"));
    re.captures(link)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Strip markup, decode common entities, collapse whitespace and cap the
/// length at `max_chars` (ellipsis included when truncated).
pub fn sanitize_text(raw: &str, max_chars: usize) -> String {
    static TAG: OnceLock<Regex> = OnceLock::new();
    let tag = TAG.get_or_init(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));

    let stripped = tag.replace_all(raw, " ");
    let decoded = decode_entities(&stripped);
    let collapsed = decoded.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate_with_ellipsis(&collapsed, max_chars)
}

/// Cap at `max_chars` characters; when cut, the last three become `...`
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(ELLIPSIS.len());
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&amp;", "&")
}

/// Source tags, the query, and any fashion keywords found in title/description
pub fn extract_tags(source: ImageSource, query: &str, title: &str, description: &str) -> Tags {
    let mut tags = Tags::new();
    let base: &[&str] = match source {
        ImageSource::Google => &["Fashion", "Style", "Google"],
        ImageSource::Pinterest => &["Pinterest", "Fashion", "Style"],
        ImageSource::Database | ImageSource::Curated => &["Fashion"],
    };
    for tag in base {
        tags.insert(*tag);
    }
    tags.insert(query);

    let text = format!("{} {}", title, description).to_lowercase();
    for keyword in FASHION_KEYWORDS {
        if text.contains(keyword) {
            tags.insert(capitalize(keyword));
        }
    }
    tags
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Host of a URL without a leading `www.`
pub fn extract_domain(url: &str) -> Option<String> {
    let parsed = reqwest::Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    Some(host.strip_prefix("www.").unwrap_or(host).to_string())
}

fn positive_dimension(value: &Value) -> Option<u32> {
    value
        .as_u64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
        .and_then(|v| u32::try_from(v).ok())
        .filter(|v| *v > 0)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// First 12 hex chars of the SHA-256 of `input`
pub fn short_hash(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    hex::encode(digest)[..12].to_string()
}
