//! Embedded prompt constants and templates

/// Base system prompt establishing the assistant's role
pub const ASSISTANT: &str = "You are a helpful assistant answering questions about movies and cinema showtimes.

You have access to tools for resolving relative dates, looking up movie information, and querying the showtime timetable. When a question mentions a relative date or time (\"tonight\", \"tomorrow\", \"this weekend\"), resolve it first with resolve_relative_dates before querying the timetable. Use retrieve_movie_info for questions about movies themselves (genre, cast, plot, ratings) and query_timetable for when and where movies are playing.

Answer concisely using only information returned by the tools. If the tools return nothing relevant, say so rather than guessing.";

/// Directive sent to the model when condensing a long dialogue
pub const DIALOGUE_SUMMARY: &str = "Summarize the dialogue above in a short paragraph. Keep every detail needed to continue the conversation: which movies, cinemas, dates and times were discussed, and what the user is trying to find out.";

/// Template for rewriting relative date expressions
pub fn resolve_dates(date: &str, time: &str, weekday: &str, question: &str) -> String {
    format!(
        "Today is {weekday}, {date} and the current time is {time}.\n\
         Rewrite the user's message below, replacing every relative date or time expression \
         (such as \"today\", \"tonight\", \"tomorrow evening\", \"this weekend\") with the \
         explicit date in YYYY-MM-DD form and, where relevant, the time. Change nothing else. \
         Output only the rewritten message.\n\nUser message: {question}"
    )
}

/// Template for generating a timetable query
pub fn generate_sql(dialect: &str, table_info: &str, question: &str) -> String {
    format!(
        "Given the question below, write a syntactically correct {dialect} query that answers \
         it. Query at most 10 rows unless the question asks for a specific number. Never select \
         every column; only the columns relevant to the question. Only use columns and tables \
         from the schema description.\n\n\
         Schema:\n{table_info}\n\n\
         Question: {question}\n\n\
         Respond with a JSON object of the form {{\"query\": \"...\"}} and nothing else."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_dates_interpolates() {
        let prompt = resolve_dates("2026-08-06", "18:45", "Thursday", "what's on tonight?");
        assert!(prompt.contains("Thursday, 2026-08-06"));
        assert!(prompt.contains("18:45"));
        assert!(prompt.ends_with("what's on tonight?"));
    }

    #[test]
    fn test_generate_sql_interpolates() {
        let prompt = generate_sql("sqlite", "CREATE TABLE timetable (...)", "dune showtimes");
        assert!(prompt.contains("sqlite query"));
        assert!(prompt.contains("CREATE TABLE timetable"));
        assert!(prompt.contains("dune showtimes"));
        assert!(prompt.contains("{\"query\": \"...\"}"));
    }
}
