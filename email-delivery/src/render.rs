//! HTML rendering for the daily digest.
//!
//! Layout is table-based with inline styles only; many mail clients strip
//! `<style>` blocks.

use chrono::{DateTime, Utc};
use interfaces::defs::{CategorizedDigest, Category, EnrichedArticle};
use scraper::Html;

const BADGE_BG: &str = "#1E3A5F";
const BADGE_COLOR: &str = "#FFFFFF";

/// Escape text for interpolation into HTML text or double-quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// e.g. `Monday, February 23`
pub fn subject_date(now: DateTime<Utc>) -> String {
    now.format("%A, %B %-d").to_string()
}

/// e.g. `Monday, February 23, 2026`
pub fn header_date(now: DateTime<Utc>) -> String {
    now.format("%A, %B %-d, %Y").to_string()
}

pub fn digest_subject(has_news: bool, now: DateTime<Utc>) -> String {
    let date = subject_date(now);
    if has_news {
        format!("RIA News Digest — {}", date)
    } else {
        format!("RIA News Digest — No news today ({})", date)
    }
}

fn render_article_card(item: &EnrichedArticle) -> String {
    let article = &item.article;
    let url = escape_html(&article.url);
    let title = escape_html(&article.title);
    let date_display = article.published.format("%b %-d, %Y").to_string();
    let meta = [article.source.as_str(), date_display.as_str()]
        .iter()
        .filter(|s| !s.is_empty())
        .map(|s| escape_html(s))
        .collect::<Vec<_>>()
        .join(" · ");
    let summary = escape_html(&item.summary);

    format!(
        r#"
    <table width="100%" cellpadding="0" cellspacing="0" border="0" style="margin-bottom:16px;">
      <tr>
        <td style="background:#FFFFFF;border-radius:8px;padding:20px;border:1px solid #E2E8F0;">
          <table width="100%" cellpadding="0" cellspacing="0" border="0">
            <tr>
              <td>
                <a href="{url}" style="font-size:17px;font-weight:700;color:#0A1628;text-decoration:none;line-height:1.4;display:block;margin-bottom:6px;">{title}</a>
              </td>
            </tr>
            <tr>
              <td style="font-size:12px;color:#64748B;padding-bottom:12px;">{meta}</td>
            </tr>
            <tr>
              <td style="font-size:14px;color:#374151;line-height:1.6;padding-bottom:14px;">{summary}</td>
            </tr>
            <tr>
              <td>
                <a href="{url}" style="font-size:13px;color:#2563EB;text-decoration:none;font-weight:600;">Read more →</a>
              </td>
            </tr>
          </table>
        </td>
      </tr>
    </table>"#
    )
}

fn render_category_section(category: Category, items: &[EnrichedArticle]) -> String {
    if items.is_empty() {
        return String::new();
    }

    let cards: String = items.iter().map(render_article_card).collect();
    let label = escape_html(category.label());
    let icon = category.icon();

    format!(
        r#"
    <!-- Category: {label} -->
    <table width="100%" cellpadding="0" cellspacing="0" border="0" style="margin-bottom:32px;">
      <tr>
        <td>
          <table width="100%" cellpadding="0" cellspacing="0" border="0" style="margin-bottom:16px;">
            <tr>
              <td>
                <span style="display:inline-block;background:{BADGE_BG};color:{BADGE_COLOR};font-size:13px;font-weight:700;padding:6px 14px;border-radius:20px;text-transform:uppercase;letter-spacing:0.5px;">
                  {icon} &nbsp;{label}
                </span>
              </td>
            </tr>
          </table>
          {cards}
        </td>
      </tr>
    </table>"#
    )
}

/// Render the complete email document.
pub fn render_email_html(digest: &CategorizedDigest, now: DateTime<Utc>) -> String {
    let date_header = header_date(now);

    let body_content = if digest.is_empty() {
        r#"
        <table width="100%" cellpadding="0" cellspacing="0" border="0">
          <tr>
            <td style="padding:40px;text-align:center;color:#64748B;font-size:15px;">
              No relevant RIA industry news was found since the last digest.<br>
              Check back tomorrow.
            </td>
          </tr>
        </table>"#
            .to_string()
    } else {
        let sections: String = digest
            .sections()
            .map(|(category, items)| render_category_section(category, items))
            .collect();
        format!(
            r#"
        <table width="100%" cellpadding="0" cellspacing="0" border="0">
          <tr>
            <td style="padding:32px 40px;">
              {sections}
            </td>
          </tr>
        </table>"#
        )
    };

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>FastTrackr AI · Daily RIA News Digest</title>
</head>
<body style="margin:0;padding:0;background-color:#F8FAFC;font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',Roboto,Helvetica,Arial,sans-serif;">
  <table width="100%" cellpadding="0" cellspacing="0" border="0" bgcolor="#F8FAFC">
    <tr>
      <td align="center" style="padding:24px 16px;">
        <table width="640" cellpadding="0" cellspacing="0" border="0" style="max-width:640px;width:100%;">
          <tr>
            <td style="background:#0A1628;border-radius:12px 12px 0 0;padding:32px 40px;">
              <div style="font-size:12px;color:#94A3B8;text-transform:uppercase;letter-spacing:1px;margin-bottom:8px;font-weight:600;">FastTrackr AI</div>
              <div style="font-size:24px;font-weight:800;color:#FFFFFF;margin-bottom:6px;line-height:1.2;">Daily RIA News Digest</div>
              <div style="font-size:14px;color:#94A3B8;">{date_header}</div>
            </td>
          </tr>
          <tr>
            <td style="background:#F8FAFC;padding:0;">
              {body_content}
            </td>
          </tr>
          <tr>
            <td style="background:#0A1628;border-radius:0 0 12px 12px;padding:24px 40px;color:#94A3B8;font-size:12px;line-height:1.6;">
              <a href="https://fasttrackr.ai" style="color:#60A5FA;text-decoration:none;font-weight:600;">fasttrackr.ai</a>
              &nbsp;·&nbsp; Daily digest for the FastTrackr AI team
              <br>
              News sourced from NewsData.io, AdvisorHub, RIABiz, WealthManagement.com, and Financial Planning.
            </td>
          </tr>
        </table>
      </td>
    </tr>
  </table>
</body>
</html>"##
    )
}

/// Plain-text alternative for clients that don't render HTML.
pub fn html_to_plain_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let body = scraper::Selector::parse("body").ok();
    let root = body
        .as_ref()
        .and_then(|sel| document.select(sel).next())
        .unwrap_or_else(|| document.root_element());

    root.text()
        .flat_map(|chunk| chunk.lines())
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
