//! The task description handed to the agent.
//!
//! All of the actual collection work (fetching sources, classifying,
//! summarizing, deduplicating, appending) happens inside the agent. This
//! prompt is the whole contract.

use std::path::Path;

/// Inputs the prompt refers to.
#[derive(Debug, Clone)]
pub struct PromptContext<'a> {
    pub whitelist_path: &'a Path,
    pub snapshot_path: &'a Path,
    pub summary_language: &'a str,
    /// Whether a previous session is being resumed.
    pub resuming: bool,
}

/// Render the collection task.
pub fn collection_prompt(ctx: &PromptContext<'_>) -> String {
    let whitelist = ctx.whitelist_path.display();
    let snapshot = ctx.snapshot_path.display();
    let language = ctx.summary_language;

    let session_note = if ctx.resuming {
        "- Skip every article (by URL) you already collected in earlier turns of this session.\n"
    } else {
        ""
    };

    format!(
        "Collect AI industry news and save it to {snapshot}.

## Steps

1. Read the source list from {whitelist}. Its shape is {{ \"sources\": [{{ \"url\", \"sourceName\" }}] }}.
   Only articles from these sources may be collected.
2. Run WebFetch on every source URL to get its content.
3. For each article extract:
   - title: the article headline
   - url: the absolute article URL
   - publishedAt: the publication time (ISO 8601)
   - sourceName: the source name from {whitelist}
4. Classify each article into exactly one category:
   - Model: LLMs, foundation models, training techniques
   - Service: APIs, products, services
   - Other: everything else
5. Assign an importance:
   - high: new model releases, major announcements
   - normal: everything else
6. Write a summary of about 100 characters in {language}.
7. Give each article a unique id of the form YYYYMMDD-NNN.
8. Save to {snapshot}:
   - set lastUpdated to the current time (ISO 8601)
   - append the new articles to the news array, keeping existing entries
   - the file shape is {{ \"lastUpdated\": string, \"news\": [{{ \"id\", \"title\", \"url\", \"sourceName\", \"category\", \"publishedAt\", \"summary\", \"importance\" }}] }}
   - create the file with an empty news array if it does not exist

## Duplicates
{session_note}- Skip every URL already present in {snapshot}.
- Log every duplicate you skip.

## Failures
- If a URL cannot be fetched, log it and move on to the next source.
- Process every source.
"
    )
}
