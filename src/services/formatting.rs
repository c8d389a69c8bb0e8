use chrono::{DateTime, Datelike, Utc};
use std::fmt::Write;

use crate::{
    models::{CatalogEntry, Enrichment, ScoredEntry, Variant},
    services::patterns::TitleClassifier,
};

const NOTIFIED_VARIANTS: usize = 3;
const SEARCH_VARIANTS: usize = 5;
const MAX_PLOT_CHARS: usize = 150;
const QUALITY_ORDER: &[&str] = &["2160p", "1080p", "720p", "480p"];

/// Renders entries as Markdown messages for the chat channel
#[derive(Debug, Clone)]
pub struct NotificationFormatter {
    classifier: TitleClassifier,
    site_url: String,
}

impl NotificationFormatter {
    pub fn new(classifier: TitleClassifier, site_url: String) -> Self {
        Self {
            classifier,
            site_url: site_url.trim_end_matches('/').to_string(),
        }
    }

    fn movie_link(&self, entry: &CatalogEntry) -> String {
        format!(
            "{}/movies/{}",
            self.site_url,
            entry.slug.as_deref().unwrap_or_default()
        )
    }

    pub fn headline(&self, entry: &CatalogEntry, now: DateTime<Utc>) -> &'static str {
        let traits = self.classifier.classify(&entry.title);
        if traits.franchise {
            "🎬 *🔥 FAMOUS MAINSTREAM RELEASE!*"
        } else if traits.sequel || traits.has_digit {
            "🎬 *🎭 SEQUEL/REMAKE ALERT!*"
        } else if entry.year_or_zero() >= now.year() {
            "🎬 *🔥 HOT NEW RELEASE!*"
        } else {
            "🎬 *NEW HIGH-RATED MOVIE!*"
        }
    }

    /// Full notification for a newly surfaced entry
    pub fn notification(
        &self,
        scored: &ScoredEntry,
        enrichment: Option<&Enrichment>,
        now: DateTime<Utc>,
    ) -> String {
        let entry = &scored.entry;
        let traits = self.classifier.classify(&entry.title);
        let is_recent = entry.year_or_zero() >= now.year();

        let mut out = String::new();
        let _ = writeln!(out, "{}\n", self.headline(entry, now));
        let _ = writeln!(out, "📽️ *{}* ({})", display_title(entry), display_year(entry));
        let _ = writeln!(out, "⭐ *IMDb Rating:* {}/10", display_rating(entry));
        let _ = writeln!(out, "🎭 *Genres:* {}", escape_markdown(&entry.genres.join(", ")));
        let _ = writeln!(out, "{}", recency_line(entry, now));

        if is_recent {
            let _ = writeln!(out, "🚀 *Recent Release* ({}+)", now.year());
        }
        if traits.franchise {
            let _ = writeln!(out, "🌟 *FAMOUS MOVIE* - Media talked about!");
        } else if traits.sequel || traits.has_digit {
            let _ = writeln!(out, "🎭 *SEQUEL/REMAKE* - Highly anticipated!");
        }
        out.push('\n');

        if let Some(enrichment) = enrichment {
            write_enrichment(&mut out, enrichment);
        }

        if !entry.variants.is_empty() {
            let _ = writeln!(out, "📥 *Available Qualities:*");
            for (i, variant) in entry.variants.iter().take(NOTIFIED_VARIANTS).enumerate() {
                let _ = writeln!(
                    out,
                    "{}. *{}* - {} (🌱 {} seeds)",
                    i + 1,
                    escape_markdown(&variant.quality),
                    escape_markdown(&variant.size),
                    variant.seeds
                );
            }
        }

        let _ = write!(out, "\n🔗 *YTS Link:* {}", self.movie_link(entry));
        out
    }

    /// One search hit with its best variants
    pub fn search_result(&self, entry: &CatalogEntry) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "🎬 *{}* ({})", display_title(entry), display_year(entry));
        let _ = writeln!(out, "⭐ Rating: {}/10", display_rating(entry));
        let _ = writeln!(out, "🎭 Genres: {}\n", escape_markdown(&entry.genres.join(", ")));

        let variants = sort_by_quality(&entry.variants);
        if variants.is_empty() {
            let _ = writeln!(out, "❌ No torrents available");
            return out;
        }

        let _ = writeln!(out, "📥 *Available Torrents:*");
        for (i, variant) in variants.into_iter().take(SEARCH_VARIANTS).enumerate() {
            let _ = writeln!(
                out,
                "{}. *{}* - {}",
                i + 1,
                escape_markdown(&variant.quality),
                escape_markdown(&variant.size)
            );
            let _ = writeln!(out, "   🌱 Seeds: {} | 👥 Peers: {}", variant.seeds, variant.peers);
            if let Some(url) = variant.url.as_deref() {
                let _ = writeln!(out, "   🔗 [Download]({})", url);
            }
        }
        out
    }
}

/// Escapes the characters legacy Telegram Markdown treats as entity markers
pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '_' | '*' | '[' | '`') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn display_title(entry: &CatalogEntry) -> String {
    if entry.title.is_empty() {
        "Unknown".to_string()
    } else {
        escape_markdown(&entry.title)
    }
}

fn display_year(entry: &CatalogEntry) -> String {
    entry
        .year
        .map(|y| y.to_string())
        .unwrap_or_else(|| "Unknown".to_string())
}

fn display_rating(entry: &CatalogEntry) -> String {
    format!("{}", entry.rating_or_zero())
}

fn write_enrichment(out: &mut String, enrichment: &Enrichment) {
    if let Some(rt) = enrichment.ratings.get("Rotten Tomatoes") {
        let _ = writeln!(out, "🍅 *Rotten Tomatoes:* {}", escape_markdown(rt));
    }
    if let Some(mc) = enrichment.ratings.get("Metacritic") {
        let _ = writeln!(out, "📊 *Metacritic:* {}", escape_markdown(mc));
    }
    if let Some(runtime) = enrichment.runtime.as_deref() {
        let _ = writeln!(out, "⏱️ *Runtime:* {}", escape_markdown(runtime));
    }
    if let Some(plot) = enrichment
        .plot
        .as_deref()
        .filter(|p| p.chars().count() < MAX_PLOT_CHARS)
    {
        let _ = writeln!(out, "📝 *Plot:* {}", escape_markdown(plot));
    }
    out.push('\n');
}

/// Human description of how recently the entry was listed
pub fn recency_line(entry: &CatalogEntry, now: DateTime<Utc>) -> String {
    let Some(listed_at) = entry.listed_at_utc() else {
        return match entry.listed_at.as_deref() {
            Some(raw) if !raw.trim().is_empty() => format!("📅 Added: {}", escape_markdown(raw)),
            _ => "📅 Added: Unknown".to_string(),
        };
    };

    let hours = (now - listed_at).num_seconds() as f64 / 3600.0;
    if hours <= 24.0 {
        "🔥 JUST ADDED TO YTS! (Last 24 hours)".to_string()
    } else if hours <= 72.0 {
        "⚡ FRESH YTS RELEASE! (Last 3 days)".to_string()
    } else if hours <= 168.0 {
        "🆕 NEW YTS ADDITION! (Last week)".to_string()
    } else {
        format!("📅 Added {}", listed_at.format("%B %d, %Y"))
    }
}

/// Variants ordered 2160p, 1080p, 720p, 480p, then anything else
pub fn sort_by_quality(variants: &[Variant]) -> Vec<&Variant> {
    let rank = |variant: &Variant| {
        let quality = variant.quality.to_lowercase();
        QUALITY_ORDER
            .iter()
            .position(|q| quality.contains(q))
            .unwrap_or(QUALITY_ORDER.len())
    };

    let mut sorted: Vec<&Variant> = variants.iter().collect();
    sorted.sort_by_key(|v| rank(*v));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::{entry, variant};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 12, 12, 0, 0).unwrap()
    }

    fn formatter() -> NotificationFormatter {
        NotificationFormatter::new(TitleClassifier::default(), "https://yts.mx/".to_string())
    }

    fn scored(e: CatalogEntry) -> ScoredEntry {
        ScoredEntry { entry: e, score: 100.0 }
    }

    #[test]
    fn test_headline_priority() {
        let f = formatter();
        assert!(f.headline(&entry(1, "28 Years Later"), now()).contains("FAMOUS"));
        assert!(f.headline(&entry(2, "The Reboot"), now()).contains("SEQUEL"));
        assert!(f.headline(&entry(3, "Quiet Room"), now()).contains("HOT NEW"));

        let mut old = entry(4, "Quiet Room");
        old.year = Some(2020);
        assert!(f.headline(&old, now()).contains("HIGH-RATED"));
    }

    #[test]
    fn test_recency_lines() {
        let mut e = entry(1, "Heat");
        e.listed_at = Some((now() - Duration::hours(3)).to_rfc3339());
        assert!(recency_line(&e, now()).contains("Last 24 hours"));

        e.listed_at = Some((now() - Duration::hours(50)).to_rfc3339());
        assert!(recency_line(&e, now()).contains("Last 3 days"));

        e.listed_at = Some((now() - Duration::hours(100)).to_rfc3339());
        assert!(recency_line(&e, now()).contains("Last week"));

        e.listed_at = Some("2025-05-02 08:00:00".to_string());
        assert_eq!(recency_line(&e, now()), "📅 Added May 02, 2025");

        e.listed_at = Some("garbled".to_string());
        assert_eq!(recency_line(&e, now()), "📅 Added: garbled");

        e.listed_at = None;
        assert_eq!(recency_line(&e, now()), "📅 Added: Unknown");
    }

    #[test]
    fn test_notification_contents() {
        let mut e = entry(1, "28 Years Later");
        e.slug = Some("28-years-later-2025".to_string());
        e.rating = Some(6.9);
        e.genres = vec!["Horror".to_string(), "Thriller".to_string()];
        e.variants = vec![
            variant("720p", 120),
            variant("1080p", 210),
            variant("2160p", 30),
            variant("3D", 1),
        ];

        let text = formatter().notification(&scored(e), None, now());
        assert!(text.starts_with("🎬 *🔥 FAMOUS MAINSTREAM RELEASE!*"));
        assert!(text.contains("*28 Years Later* (2025)"));
        assert!(text.contains("6.9/10"));
        assert!(text.contains("Horror, Thriller"));
        assert!(text.contains("🚀 *Recent Release* (2025+)"));
        assert!(text.contains("3. *2160p*"));
        assert!(!text.contains("3D"));
        assert!(text.ends_with("https://yts.mx/movies/28-years-later-2025"));
    }

    #[test]
    fn test_notification_with_enrichment() {
        let mut enrichment = Enrichment {
            runtime: Some("115 min".to_string()),
            plot: Some("Short plot.".to_string()),
            ..Enrichment::default()
        };
        enrichment
            .ratings
            .insert("Rotten Tomatoes".to_string(), "89%".to_string());

        let text = formatter().notification(&scored(entry(1, "Heat")), Some(&enrichment), now());
        assert!(text.contains("🍅 *Rotten Tomatoes:* 89%"));
        assert!(text.contains("⏱️ *Runtime:* 115 min"));
        assert!(text.contains("📝 *Plot:* Short plot."));
        assert!(!text.contains("Metacritic"));
    }

    #[test]
    fn test_escape_markdown() {
        assert_eq!(
            escape_markdown("Fast_Furious *X* [2] `cut`"),
            r"Fast\_Furious \*X\* \[2] \`cut\`"
        );
        assert_eq!(escape_markdown("Heat"), "Heat");
    }

    #[test]
    fn test_notification_escapes_interpolated_fields() {
        let mut e = entry(1, "Mission_Impossible *Final*");
        e.genres = vec!["Sci_Fi".to_string()];
        e.variants = vec![variant("1080p*", 10)];
        let enrichment = Enrichment {
            plot: Some("Agent_X returns [again].".to_string()),
            ..Enrichment::default()
        };

        let text = formatter().notification(&scored(e), Some(&enrichment), now());
        assert!(text.contains(r"*Mission\_Impossible \*Final\** (2025)"));
        assert!(text.contains(r"🎭 *Genres:* Sci\_Fi"));
        assert!(text.contains(r"📝 *Plot:* Agent\_X returns \[again]."));
        assert!(text.contains(r"1. *1080p\** - 1.2 GB"));
        assert!(!text.contains("Mission_Impossible"));
    }

    #[test]
    fn test_search_result_escapes_title() {
        let text = formatter().search_result(&entry(1, "The_Thing"));
        assert!(text.contains(r"🎬 *The\_Thing* (2025)"));
    }

    #[test]
    fn test_long_plot_omitted() {
        let enrichment = Enrichment {
            plot: Some("x".repeat(200)),
            ..Enrichment::default()
        };
        let text = formatter().notification(&scored(entry(1, "Heat")), Some(&enrichment), now());
        assert!(!text.contains("Plot"));
    }

    #[test]
    fn test_sort_by_quality() {
        let variants = vec![
            variant("720p", 1),
            variant("3D", 1),
            variant("2160p", 1),
            variant("1080p.x265", 1),
        ];
        let order: Vec<&str> = sort_by_quality(&variants)
            .iter()
            .map(|v| v.quality.as_str())
            .collect();
        assert_eq!(order, vec!["2160p", "1080p.x265", "720p", "3D"]);
    }

    #[test]
    fn test_search_result_without_variants() {
        let text = formatter().search_result(&entry(1, "Heat"));
        assert!(text.contains("No torrents available"));
    }

    #[test]
    fn test_search_result_lists_best_first() {
        let mut e = entry(1, "Heat");
        e.variants = vec![variant("720p", 5), variant("1080p", 9)];
        e.variants[1].url = Some("https://yts.mx/t/9".to_string());

        let text = formatter().search_result(&e);
        let first = text.find("*1080p*").unwrap();
        let second = text.find("*720p*").unwrap();
        assert!(first < second);
        assert!(text.contains("[Download](https://yts.mx/t/9)"));
    }
}
