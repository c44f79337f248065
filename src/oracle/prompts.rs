//! Prompt templates for the chat-completions oracle

/// Reply meaning the page holds no answer
pub const NO_ANSWER: &str = "NO_ANSWER";

/// Reply meaning no link is worth following
pub const NO_LINK: &str = "NO_LINK";

/// Builds the prompt asking whether `content` answers `question`
pub fn answer_check(content: &str, question: &str) -> String {
    format!(
        "You read web page text and decide whether it answers a question.

Steps:
1. Look for a direct or indirect answer to the question in the page text.
2. If there is one, reply with the answer alone, as short as possible.
3. If there is none, reply with exactly {NO_ANSWER}.

Hints:
- Email addresses usually follow words like \"email\" or \"contact\", or contain \"@\".
- When the answer is a web address, reply with the full URL, including the scheme.
- Web interfaces are often described as a panel, dashboard or interface with a link.
- Certifications usually mention ISO or another standard number.
- When several answers fit, pick the most specific one.

Page text:
{content}

Question: {question}

Answer:"
    )
}

/// Builds the prompt asking which of `links` most likely leads to the answer
pub fn link_selection(content: &str, question: &str, links: &[String]) -> String {
    let links = links.join("\n");
    format!(
        "You help navigate a website towards the answer to a question.

Given the text of the current page, the question and the links on the page:
1. Judge which link is most likely to lead to the answer.
2. Reply with that single link, copied exactly as listed.
3. If none of the links looks useful, reply with exactly {NO_LINK}.

Prefer links whose wording relates to the question and that lead deeper into
the topic. Skip login, legal and other administrative pages.

Page text:
{content}

Question: {question}

Links:
{links}

Link:"
    )
}
