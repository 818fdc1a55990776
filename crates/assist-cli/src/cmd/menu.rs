//! The numbered interactive menu.
//!
//! [`Session`] reads from any `BufRead` and writes to any `Write`, so the
//! whole loop can be driven from a byte buffer. No operation failure ends
//! the session; only choice 9 or end of input does.

use super::{load_config, model_client, recipe_store};
use crate::output::{rule, truncate};
use assist_core::assistant;
use assist_core::extract;
use assist_core::model::{ErrorKind, Generate, Generation, ModelError};
use assist_core::recipe::{self, Recipe, RecipeStore};
use assist_core::AssistError;
use std::io::{self, BufRead, Write};
use std::path::Path;
use tracing::debug;

/// Typed at a free-text prompt to return to the menu.
const BACK: &str = "back";

/// Command column width in the search listing.
const SEARCH_PREVIEW: usize = 70;
/// Command column width in the explain listing.
const EXPLAIN_PREVIEW: usize = 50;

pub fn run(root: &Path) -> anyhow::Result<()> {
    let config = load_config(root)?;
    let client = model_client(&config)?;
    if !client.has_api_key() {
        anyhow::bail!(
            "FATAL ERROR: API key is not set. Set the {} environment variable.",
            config.model.api_key_env
        );
    }
    let store = recipe_store(root, &config);
    let stdin = io::stdin();
    let mut session = Session::new(stdin.lock(), io::stdout(), &client, store);
    session.run()?;
    Ok(())
}

pub struct Session<'a, R, W> {
    input: R,
    out: W,
    model: &'a dyn Generate,
    store: RecipeStore,
}

impl<'a, R: BufRead, W: Write> Session<'a, R, W> {
    pub fn new(input: R, out: W, model: &'a dyn Generate, store: RecipeStore) -> Self {
        Self {
            input,
            out,
            model,
            store,
        }
    }

    pub fn run(&mut self) -> io::Result<()> {
        loop {
            self.print_menu()?;
            let Some(choice) = self.read_line()? else {
                break;
            };
            debug!(choice = choice.trim(), "menu choice");
            match choice.trim() {
                "1" => self.ask()?,
                "2" => self.explain_code()?,
                "3" => self.generate_code()?,
                "4" => self.summarize()?,
                "5" => self.generate_recipe()?,
                "6" => self.add_recipe()?,
                "7" => self.search_recipes()?,
                "8" => self.explain_recipe()?,
                "9" => break,
                _ => writeln!(
                    self.out,
                    "Invalid choice. Please enter a number between 1 and 9."
                )?,
            }
        }
        writeln!(self.out, "Thank you for using the AI Assistant CLI. Goodbye!")?;
        self.out.flush()
    }

    fn print_menu(&mut self) -> io::Result<()> {
        write!(
            self.out,
            "\n=== AI Assistant & Recipes ===\n\
             --- AI Analysis & Generation ---\n\
             1. General Q&A (Web Search)\n\
             2. Explain Code Snippet\n\
             3. Code Generator\n\
             4. Summarize Local File (Multi-format)\n\
             --- Command Recipe Vault ---\n\
             5. Generate New Recipe (AI)\n\
             6. Add Known Recipe (Manual)\n\
             7. Search & View Recipe\n\
             8. Explain Recipe (AI)\n\
             9. Exit\n\
             Enter your choice (1-9): "
        )?;
        self.out.flush()
    }

    // -- input helpers ------------------------------------------------------

    /// One line without its terminator; `None` at end of input.
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    /// Show `prompt` and read a trimmed answer. `None` when the user typed
    /// `back` or input ended.
    fn prompt(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.out, "{prompt}")?;
        self.out.flush()?;
        Ok(self
            .read_line()?
            .map(|l| l.trim().to_string())
            .filter(|l| !l.eq_ignore_ascii_case(BACK)))
    }

    fn print_reply(&mut self, heading: &str, generation: &Generation) -> io::Result<()> {
        writeln!(self.out, "\n{}", rule())?;
        writeln!(self.out, "{heading}")?;
        writeln!(self.out, "{}", generation.text)?;
        if !generation.citations.is_empty() {
            writeln!(self.out, "\nSources (Grounding):")?;
            for citation in &generation.citations {
                writeln!(self.out, "{citation}")?;
            }
        }
        writeln!(self.out, "{}\n", rule())
    }

    fn print_failure(&mut self, message: impl std::fmt::Display) -> io::Result<()> {
        writeln!(self.out, "{message}")
    }

    /// The error text, plus a hint when trying again later may help.
    fn print_model_failure(&mut self, e: &ModelError) -> io::Result<()> {
        writeln!(self.out, "{e}")?;
        match e.kind() {
            ErrorKind::Transient => {
                writeln!(self.out, "The service is rate limiting requests. Try again in a moment.")
            }
            ErrorKind::Network => {
                writeln!(self.out, "Check your network connection and try again.")
            }
            ErrorKind::Configuration | ErrorKind::Permanent => Ok(()),
        }
    }

    // -- 1-4: assistant -----------------------------------------------------

    fn ask(&mut self) -> io::Result<()> {
        writeln!(self.out, "\n--- 1. General AI Chat (Web Search) ---")?;
        let Some(question) = self.prompt("Ask your question (or type 'back'):\n> ")? else {
            return Ok(());
        };
        if question.is_empty() {
            return Ok(());
        }
        match assistant::ask(self.model, &question) {
            Ok(generation) => self.print_reply("AI Response:", &generation),
            Err(e) => self.print_model_failure(&e),
        }
    }

    fn explain_code(&mut self) -> io::Result<()> {
        writeln!(self.out, "\n--- 2. Code Explainer ---")?;
        writeln!(
            self.out,
            "Paste your code snippet below. Type 'END' on a new line when finished."
        )?;
        self.out.flush()?;

        let mut lines = Vec::new();
        while let Some(line) = self.read_line()? {
            if assistant::is_end_marker(&line) {
                break;
            }
            lines.push(line);
        }
        let snippet = lines.join("\n");
        if snippet.trim().is_empty() {
            return writeln!(self.out, "No code provided. Returning to main menu.");
        }
        match assistant::explain_code(self.model, &snippet) {
            Ok(generation) => self.print_reply("Code Analysis:", &generation),
            Err(e) => self.print_model_failure(&e),
        }
    }

    fn generate_code(&mut self) -> io::Result<()> {
        writeln!(self.out, "\n--- 3. Code Generator ---")?;
        let Some(request) = self.prompt(
            "Describe the code you need (e.g., 'Python script for a merge sort algorithm'):\n> ",
        )?
        else {
            return Ok(());
        };
        if request.is_empty() {
            return Ok(());
        }
        match assistant::generate_code(self.model, &request) {
            Ok(generation) => self.print_reply("Generated Code:", &generation),
            Err(e) => self.print_model_failure(&e),
        }
    }

    fn summarize(&mut self) -> io::Result<()> {
        writeln!(self.out, "\n--- 4. Summarize Local File (Multi-format) ---")?;
        let Some(path) =
            self.prompt("Enter the path to the file you want to analyze (or type 'back'):\n> ")?
        else {
            return Ok(());
        };
        let path = Path::new(&path);

        let summary = match assistant::summary_request(extract::extract(path)) {
            Ok(summary) => summary,
            Err(e) => return self.print_failure(e),
        };
        if let Some(chars) = summary.extracted_chars {
            writeln!(
                self.out,
                "Successfully extracted {chars} characters from '{}'.",
                path.display()
            )?;
        }
        match self.model.generate(&summary.request) {
            Ok(generation) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                self.print_reply(&format!("Summary of {name}:"), &generation)
            }
            Err(e) => self.print_model_failure(&e),
        }
    }

    // -- 5-8: recipes -------------------------------------------------------

    /// Offer AI tags for `command`, then merge in the user's own.
    /// `None` when the user backed out.
    fn collect_tags(&mut self, command: &str) -> io::Result<Option<Vec<String>>> {
        writeln!(self.out, "... AI analyzing command to suggest tags...")?;
        let suggested = match assistant::suggest_tags(self.model, command) {
            Ok(tags) => tags,
            Err(e) => {
                debug!(error = %e, "tag suggestion failed");
                writeln!(
                    self.out,
                    "Warning: AI tagging failed due to API error. Using no suggested tags."
                )?;
                Vec::new()
            }
        };

        writeln!(self.out, "\n--- Tagging ---")?;
        let answer = if suggested.is_empty() {
            self.prompt("Enter comma-separated tags:\n> ")?
        } else {
            writeln!(self.out, "AI Suggested Tags: {}", suggested.join(", "))?;
            self.prompt("Enter additional tags (or press Enter to use AI's suggestions):\n> ")?
        };
        Ok(answer.map(|input| recipe::merge_tags(&suggested, &recipe::parse_tags(&input))))
    }

    /// Report the outcome of an append. True when the recipe was written.
    fn report_saved(&mut self, saved: assist_core::Result<Vec<Recipe>>) -> io::Result<bool> {
        match saved {
            Ok(_) => {
                writeln!(self.out, "\nRecipes saved to {}.", self.store.path().display())?;
                Ok(true)
            }
            Err(AssistError::RecipeExists(name)) => {
                writeln!(self.out, "{}", duplicate_message(&name))?;
                Ok(false)
            }
            Err(e) => {
                writeln!(self.out, "Error saving recipes: {e}")?;
                Ok(false)
            }
        }
    }

    fn generate_recipe(&mut self) -> io::Result<()> {
        writeln!(self.out, "\n--- 5. Generate New Recipe (AI) ---")?;
        let Some(description) = self.prompt(
            "Describe the task you want a CLI command for \
             (e.g., 'how to delete all old docker images'):\n> ",
        )?
        else {
            return Ok(());
        };
        if description.is_empty() {
            return writeln!(self.out, "Description cannot be empty. Returning to menu.");
        }

        writeln!(self.out, "... AI generating command...")?;
        let command = match assistant::generate_command(self.model, &description) {
            Ok(Some(command)) => command,
            Ok(None) => {
                return writeln!(
                    self.out,
                    "Failed to generate a valid command. Please try a different description."
                )
            }
            Err(e) => {
                writeln!(self.out, "Error: AI command generation failed: {e}")?;
                return writeln!(
                    self.out,
                    "Failed to generate a valid command. Please try a different description."
                );
            }
        };
        let name = assistant::recipe_name(&description);

        writeln!(self.out, "\n{}", rule())?;
        writeln!(self.out, "AI Suggestion:")?;
        writeln!(self.out, "Name: {name}")?;
        writeln!(self.out, "Command: {command}")?;
        writeln!(self.out, "{}", rule())?;

        let confirm = self.prompt("Do you want to save this command to your Recipe Book? (y/n): ")?;
        if !confirm.is_some_and(|c| c.eq_ignore_ascii_case("y")) {
            return writeln!(self.out, "Recipe discarded.");
        }

        let Some(tags) = self.collect_tags(&command)? else {
            return Ok(());
        };
        let new = match Recipe::new(&name, &command, tags) {
            Ok(r) => r,
            Err(e) => return writeln!(self.out, "Error: {e}"),
        };
        let saved = self.store.append(new);
        if self.report_saved(saved)? {
            writeln!(self.out, "Successfully saved AI-generated recipe '{name}'.")?;
        }
        Ok(())
    }

    fn add_recipe(&mut self) -> io::Result<()> {
        writeln!(self.out, "\n--- 6. Add Known Recipe (Manual) ---")?;
        let Some(name) = self.prompt(
            "Enter a unique name for this recipe (e.g., 'Grep Python Files'):\n> ",
        )?
        else {
            return Ok(());
        };
        if name.is_empty() {
            return writeln!(self.out, "Recipe name cannot be empty.");
        }
        let Some(command) = self.prompt(
            "Paste the full command string (e.g., 'grep -r --include=*.py \"import\" .'):\n> ",
        )?
        else {
            return Ok(());
        };
        if command.is_empty() {
            return writeln!(self.out, "Command cannot be empty.");
        }

        // Checked before tagging so a duplicate never costs a model call.
        if recipe::ensure_unique_name(&self.store.load(), &name).is_err() {
            return writeln!(self.out, "{}", duplicate_message(&name));
        }

        let Some(tags) = self.collect_tags(&command)? else {
            return Ok(());
        };
        let new = match Recipe::new(&name, &command, tags) {
            Ok(r) => r,
            Err(e) => return writeln!(self.out, "Error: {e}"),
        };
        let tag_count = new.tags.len();
        let saved = self.store.add_unique(new);
        if self.report_saved(saved)? {
            writeln!(
                self.out,
                "Successfully added recipe '{name}' with {tag_count} tags."
            )?;
        }
        Ok(())
    }

    /// Load, ask for a query, and return matches. `None` when there is
    /// nothing to choose from or the user backed out.
    fn find_recipes(&mut self, prompt: &str) -> io::Result<Option<Vec<Recipe>>> {
        let recipes = self.store.load();
        if recipes.is_empty() {
            writeln!(
                self.out,
                "\nNo command recipes found. Please add one first (Option 5 or 6)."
            )?;
            return Ok(None);
        }
        let Some(query) = self.prompt(prompt)? else {
            return Ok(None);
        };
        let hits: Vec<Recipe> = recipe::search(&recipes, &query)
            .into_iter()
            .cloned()
            .collect();
        if hits.is_empty() {
            writeln!(
                self.out,
                "No recipes found matching '{}'.",
                query.to_lowercase()
            )?;
            return Ok(None);
        }
        writeln!(self.out, "\nFound {} recipes:", hits.len())?;
        Ok(Some(hits))
    }

    /// Read a 1-based selection. `Err(())` for non-numeric input.
    fn read_selection(&mut self, prompt: &str) -> io::Result<Option<Result<usize, ()>>> {
        Ok(self
            .prompt(prompt)?
            .map(|answer| answer.parse::<usize>().map_err(|_| ())))
    }

    fn search_recipes(&mut self) -> io::Result<()> {
        writeln!(self.out, "\n--- 7. Search & View Recipe ---")?;
        let Some(hits) = self.find_recipes("Enter a keyword or tag to search:\n> ")? else {
            return Ok(());
        };
        for (i, r) in hits.iter().enumerate() {
            writeln!(self.out, "{}. Name: {}", i + 1, r.name)?;
            writeln!(self.out, "  Tags: {}", r.tags.join(", "))?;
            writeln!(
                self.out,
                "  Command: {}",
                truncate(&r.command, SEARCH_PREVIEW)
            )?;
        }

        let selected = match self
            .read_selection("Enter the number of the recipe you want to view/copy:\n> ")?
        {
            None => return Ok(()),
            Some(Err(())) => return writeln!(self.out, "Invalid input. Please enter a number."),
            Some(Ok(n)) if n >= 1 && n <= hits.len() => &hits[n - 1],
            Some(Ok(_)) => return writeln!(self.out, "Invalid selection number."),
        };

        let bar = "#".repeat(60);
        let dashes = "-".repeat(50);
        writeln!(self.out, "\n{bar}")?;
        writeln!(self.out, "Recipe: {}", selected.name)?;
        writeln!(self.out, "Tags: {}", selected.tags.join(", "))?;
        writeln!(self.out, "\nFull Command:\n{dashes}")?;
        writeln!(self.out, "{}", selected.command)?;
        writeln!(self.out, "{dashes}")?;
        writeln!(
            self.out,
            "\nNOTE: Please copy the command above and paste it into your shell."
        )?;
        writeln!(self.out, "{bar}\n")
    }

    fn explain_recipe(&mut self) -> io::Result<()> {
        writeln!(self.out, "\n--- 8. Explain Recipe (AI) ---")?;
        let Some(hits) = self
            .find_recipes("Enter keyword or tag to find the recipe you want explained:\n> ")?
        else {
            return Ok(());
        };
        for (i, r) in hits.iter().enumerate() {
            writeln!(
                self.out,
                "{}. Name: {} | Command: {}",
                i + 1,
                r.name,
                truncate(&r.command, EXPLAIN_PREVIEW)
            )?;
        }

        let selected = match self.read_selection(
            "Enter the number of the recipe to EXPLAIN (or type 0 to cancel):\n> ",
        )? {
            None => return Ok(()),
            Some(Err(())) => return writeln!(self.out, "Invalid input. Please enter a number."),
            Some(Ok(n)) if n >= 1 && n <= hits.len() => hits[n - 1].clone(),
            Some(Ok(_)) => return writeln!(self.out, "Cancelled or Invalid selection."),
        };

        match assistant::explain_recipe(self.model, &selected) {
            Ok(generation) => {
                writeln!(self.out, "\nCommand: {}", selected.command)?;
                self.print_reply(&format!("AI Explanation for: {}", selected.name), &generation)
            }
            Err(e) => self.print_model_failure(&e),
        }
    }
}

fn duplicate_message(name: &str) -> String {
    format!("Error: Recipe named '{name}' already exists. Use a unique name.")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assist_core::model::{Citation, GenerationRequest, ModelError};
    use std::cell::RefCell;
    use std::io::Cursor;
    use tempfile::TempDir;

    /// Replies by looking for a keyword in the prompt.
    struct Scripted {
        command: &'static str,
        tags: Result<&'static str, ModelError>,
        answer: Result<&'static str, ModelError>,
        prompts: RefCell<Vec<String>>,
    }

    impl Scripted {
        fn new() -> Self {
            Self {
                command: "docker image prune -a",
                tags: Ok("docker, cleanup, images, prune, disk"),
                answer: Ok("model says hi"),
                prompts: RefCell::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.prompts.borrow().len()
        }
    }

    impl Generate for Scripted {
        fn generate(&self, request: &GenerationRequest) -> Result<Generation, ModelError> {
            self.prompts.borrow_mut().push(request.prompt.clone());
            let text = if request.prompt.contains("exactly 5 relevant tags") {
                self.tags.clone()?.to_string()
            } else if request.prompt.contains("command line utility expert") {
                format!("```bash\n{}\n```", self.command)
            } else {
                self.answer.clone()?.to_string()
            };
            let citations = if request.grounded {
                vec![Citation {
                    title: "Docs".to_string(),
                    uri: "https://docs.example".to_string(),
                }]
            } else {
                Vec::new()
            };
            Ok(Generation { text, citations })
        }
    }

    fn drive(model: &Scripted, store: RecipeStore, input: &str) -> String {
        let mut out = Vec::new();
        Session::new(Cursor::new(input.as_bytes().to_vec()), &mut out, model, store)
            .run()
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    fn temp_store(dir: &TempDir) -> RecipeStore {
        RecipeStore::new(dir.path().join("command_recipes.json"))
    }

    #[test]
    fn exit_choice_says_goodbye() {
        let dir = TempDir::new().unwrap();
        let out = drive(&Scripted::new(), temp_store(&dir), "9\n");
        assert!(out.contains("Goodbye"));
    }

    #[test]
    fn end_of_input_ends_session() {
        let dir = TempDir::new().unwrap();
        let out = drive(&Scripted::new(), temp_store(&dir), "");
        assert!(out.contains("Goodbye"));
    }

    #[test]
    fn invalid_choice_keeps_looping() {
        let dir = TempDir::new().unwrap();
        let out = drive(&Scripted::new(), temp_store(&dir), "42\n9\n");
        assert!(out.contains("Invalid choice. Please enter a number between 1 and 9."));
        assert!(out.contains("Goodbye"));
    }

    #[test]
    fn ask_prints_answer_and_sources() {
        let dir = TempDir::new().unwrap();
        let model = Scripted::new();
        let out = drive(&model, temp_store(&dir), "1\nwhat is rust?\n9\n");
        assert!(out.contains("AI Response:\nmodel says hi"));
        assert!(out.contains("Sources (Grounding):\n- [Docs](https://docs.example)"));
    }

    #[test]
    fn rate_limited_answer_suggests_retrying_later() {
        let dir = TempDir::new().unwrap();
        let mut model = Scripted::new();
        model.answer = Err(ModelError::RetriesExhausted { attempts: 3 });
        let out = drive(&model, temp_store(&dir), "1\nwhat is rust?\n9\n");
        assert!(out.contains(
            "Error: Failed to get a response after multiple retries.\n\
             The service is rate limiting requests."
        ));
        assert!(out.contains("Goodbye"));
    }

    #[test]
    fn http_failure_is_printed_without_hint() {
        let dir = TempDir::new().unwrap();
        let mut model = Scripted::new();
        model.answer = Err(ModelError::Http {
            status: 403,
            detail: "API key not valid.".to_string(),
        });
        let out = drive(&model, temp_store(&dir), "3\nsort in python\n9\n");
        assert!(out.contains("HTTP Error: 403 API key not valid.\n"));
        assert!(!out.contains("Try again"));
    }

    #[test]
    fn back_returns_to_menu_without_calling_model() {
        let dir = TempDir::new().unwrap();
        let model = Scripted::new();
        drive(&model, temp_store(&dir), "1\nBACK\n3\nback\n9\n");
        assert_eq!(model.calls(), 0);
    }

    #[test]
    fn code_snippet_reads_until_end() {
        let dir = TempDir::new().unwrap();
        let model = Scripted::new();
        let out = drive(&model, temp_store(&dir), "2\nfn main() {\n}\nend\n9\n");
        assert!(out.contains("Code Analysis:"));
        assert!(model.prompts.borrow()[0].ends_with("\n\n\nfn main() {\n}\n"));
    }

    #[test]
    fn empty_snippet_is_not_sent() {
        let dir = TempDir::new().unwrap();
        let model = Scripted::new();
        let out = drive(&model, temp_store(&dir), "2\nEND\n9\n");
        assert!(out.contains("No code provided."));
        assert_eq!(model.calls(), 0);
    }

    #[test]
    fn summarize_unsupported_file_reports_and_continues() {
        let dir = TempDir::new().unwrap();
        let clip = dir.path().join("clip.mp4");
        std::fs::write(&clip, b"\0").unwrap();
        let model = Scripted::new();
        let input = format!("4\n{}\n9\n", clip.display());
        let out = drive(&model, temp_store(&dir), &input);
        assert!(out.contains("Error: Unsupported file type for direct analysis: .mp4"));
        assert!(out.contains("Goodbye"));
        assert_eq!(model.calls(), 0);
    }

    #[test]
    fn summarize_text_file() {
        let dir = TempDir::new().unwrap();
        let notes = dir.path().join("notes.txt");
        std::fs::write(&notes, "alpha beta").unwrap();
        let model = Scripted::new();
        let input = format!("4\n{}\n9\n", notes.display());
        let out = drive(&model, temp_store(&dir), &input);
        assert!(out.contains("Successfully extracted 10 characters"));
        assert!(out.contains("Summary of notes.txt:\nmodel says hi"));
        assert!(model.prompts.borrow()[0].contains("---\nalpha beta\n---"));
    }

    #[test]
    fn generated_recipe_is_saved_after_confirmation() {
        let dir = TempDir::new().unwrap();
        let store = temp_store(&dir);
        let model = Scripted::new();
        let out = drive(
            &model,
            store.clone(),
            "5\nremove unused docker images\ny\nMaintenance\n9\n",
        );
        assert!(out.contains("Command: docker image prune -a"));
        assert!(out.contains("Successfully saved AI-generated recipe 'remove unused docker images'."));

        let saved = store.load();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].command, "docker image prune -a");
        assert_eq!(
            saved[0].tags,
            vec!["cleanup", "disk", "docker", "images", "maintenance", "prune"]
        );
    }

    #[test]
    fn declined_recipe_is_discarded() {
        let dir = TempDir::new().unwrap();
        let store = temp_store(&dir);
        let out = drive(&Scripted::new(), store.clone(), "5\nlist files\nn\n9\n");
        assert!(out.contains("Recipe discarded."));
        assert!(store.load().is_empty());
    }

    #[test]
    fn manual_add_with_failed_tagging() {
        let dir = TempDir::new().unwrap();
        let store = temp_store(&dir);
        let mut model = Scripted::new();
        model.tags = Err(ModelError::RetriesExhausted { attempts: 3 });
        let out = drive(&model, store.clone(), "6\nDisk Usage\ndu -sh *\nDisk, FS\n9\n");
        assert!(out.contains("Warning: AI tagging failed"));
        assert!(out.contains("Successfully added recipe 'Disk Usage' with 2 tags."));
        assert_eq!(store.load()[0].tags, vec!["disk", "fs"]);
    }

    #[test]
    fn generated_recipes_may_share_a_name() {
        let dir = TempDir::new().unwrap();
        let store = temp_store(&dir);
        let model = Scripted::new();
        drive(
            &model,
            store.clone(),
            "5\nprune images\ny\n\n5\nprune images\ny\n\n9\n",
        );
        let saved = store.load();
        assert_eq!(saved.len(), 2);
        assert_eq!(saved[0].name, saved[1].name);
    }

    #[test]
    fn manual_add_rejects_duplicate_before_calling_model() {
        let dir = TempDir::new().unwrap();
        let store = temp_store(&dir);
        store
            .save(&[Recipe::new("Disk Usage", "du -sh", vec![]).unwrap()])
            .unwrap();
        let model = Scripted::new();
        let out = drive(&model, store.clone(), "6\ndisk usage\ndf -h\n9\n");
        assert!(out.contains("Error: Recipe named 'disk usage' already exists."));
        assert_eq!(model.calls(), 0);
        assert_eq!(store.load().len(), 1);
    }

    #[test]
    fn search_with_empty_book() {
        let dir = TempDir::new().unwrap();
        let out = drive(&Scripted::new(), temp_store(&dir), "7\n9\n");
        assert!(out.contains("No command recipes found."));
    }

    #[test]
    fn search_and_view_full_command() {
        let dir = TempDir::new().unwrap();
        let store = temp_store(&dir);
        let long = format!("echo {}", "x".repeat(100));
        store
            .save(&[
                Recipe::new("List Docker Images", "docker images", vec!["docker".into()]).unwrap(),
                Recipe::new("Long echo", &long, vec!["echo".into()]).unwrap(),
            ])
            .unwrap();
        let out = drive(&Scripted::new(), store, "7\necho\n1\n9\n");
        assert!(out.contains("Found 1 recipes:"));
        assert!(out.contains(&format!("  Command: {}...", &long[..70])));
        assert!(out.contains(&format!("Full Command:\n{}\n{long}\n", "-".repeat(50))));
    }

    #[test]
    fn search_rejects_non_numeric_selection() {
        let dir = TempDir::new().unwrap();
        let store = temp_store(&dir);
        store
            .save(&[Recipe::new("ls", "ls -la", vec![]).unwrap()])
            .unwrap();
        let out = drive(&Scripted::new(), store, "7\nls\nfirst\n9\n");
        assert!(out.contains("Invalid input. Please enter a number."));
    }

    #[test]
    fn explain_recipe_zero_cancels() {
        let dir = TempDir::new().unwrap();
        let store = temp_store(&dir);
        store
            .save(&[Recipe::new("ls", "ls -la", vec![]).unwrap()])
            .unwrap();
        let model = Scripted::new();
        let out = drive(&model, store, "8\nls\n0\n9\n");
        assert!(out.contains("Cancelled or Invalid selection."));
        assert_eq!(model.calls(), 0);
    }

    #[test]
    fn explain_recipe_sends_command() {
        let dir = TempDir::new().unwrap();
        let store = temp_store(&dir);
        store
            .save(&[Recipe::new("ls", "ls -la", vec![]).unwrap()])
            .unwrap();
        let model = Scripted::new();
        let out = drive(&model, store, "8\nLS\n1\n9\n");
        assert!(out.contains("AI Explanation for: ls\nmodel says hi"));
        assert!(model.prompts.borrow()[0].ends_with("`ls -la`"));
    }
}
