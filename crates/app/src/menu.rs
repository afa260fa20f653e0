//! Text menu front end
//!
//! Collects input, calls into the ledger and renders results. Ledger
//! errors are shown to the user; only I/O failures end the session.

use std::io::{self, BufRead, Write};

use mealtoken_core::{
    format_timestamp, parse_timestamp, parse_token_count, Error, HallListing, HallName,
    LedgerAction, LineItem, LoginResult, MatchResult, MealType, Result, SnapshotStore,
};

use crate::state::AppState;

const MENU_ITEMS: [&str; 9] = [
    "Login / Register",
    "Sell Tokens",
    "Display Available Tokens",
    "Buy Tokens",
    "Buy From a Listed Seller",
    "Remove User (admin)",
    "Reset Users (admin)",
    "Logout",
    "Exit",
];

pub struct Menu<'a, R, W, S: SnapshotStore> {
    input: R,
    output: W,
    state: &'a mut AppState<S>,
}

impl<'a, R: BufRead, W: Write, S: SnapshotStore> Menu<'a, R, W, S> {
    pub fn new(input: R, output: W, state: &'a mut AppState<S>) -> Self {
        Self {
            input,
            output,
            state,
        }
    }

    /// Run until the user exits or input ends
    pub fn run(&mut self) -> Result<()> {
        loop {
            self.print_menu()?;
            let choice = match self.prompt("Enter your choice: ") {
                Ok(choice) => choice,
                Err(Error::Io(e)) if e.kind() == io::ErrorKind::UnexpectedEof => break,
                Err(e) => return Err(e),
            };

            let outcome = match choice.as_str() {
                "1" => self.login(),
                "2" => self.sell(),
                "3" => self.display(),
                "4" => self.buy(),
                "5" => self.buy_from_seller(),
                "6" => self.remove_user(),
                "7" => self.reset_users(),
                "8" => self.logout(),
                "9" => break,
                _ => {
                    writeln!(self.output, "Invalid choice. Please try again.")?;
                    Ok(())
                }
            };

            match outcome {
                Ok(()) => {}
                Err(Error::Io(e)) if e.kind() == io::ErrorKind::UnexpectedEof => break,
                Err(Error::Io(e)) => return Err(e.into()),
                Err(e) => {
                    tracing::debug!(error = %e, "Action rejected");
                    writeln!(self.output, "Error: {}", e)?;
                }
            }
        }

        writeln!(self.output, "Exiting the system. Goodbye!")?;
        Ok(())
    }

    fn print_menu(&mut self) -> Result<()> {
        writeln!(self.output)?;
        match self.state.current_user() {
            Some(user) => writeln!(self.output, "--- Token System Menu ({}) ---", user)?,
            None => writeln!(self.output, "--- Token System Menu ---")?,
        }
        for (i, item) in MENU_ITEMS.iter().enumerate() {
            writeln!(self.output, "{}. {}", i + 1, item)?;
        }
        Ok(())
    }

    fn prompt(&mut self, label: &str) -> Result<String> {
        write!(self.output, "{}", label)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
        }
        Ok(line.trim().to_string())
    }

    /// Hall by number (1-5) or by name
    fn prompt_hall(&mut self) -> Result<HallName> {
        let names: Vec<String> = HallName::ALL
            .iter()
            .enumerate()
            .map(|(i, hall)| format!("{}. {}", i + 1, hall))
            .collect();
        writeln!(self.output, "Halls: {}", names.join(", "))?;

        let answer = self.prompt("Enter hall: ")?;
        match answer.parse::<usize>() {
            Ok(n) if (1..=HallName::ALL.len()).contains(&n) => Ok(HallName::ALL[n - 1]),
            _ => answer.parse(),
        }
    }

    fn prompt_meal_type(&mut self) -> Result<MealType> {
        self.prompt("Enter meal type (Lunch/Dinner): ")?.parse()
    }

    /// Logged-in username, or a notice and `None`
    fn require_login(&mut self, action: LedgerAction) -> Result<Option<String>> {
        match self.state.current_user() {
            Some(user) if self.state.can_perform(action) => Ok(Some(user.to_string())),
            Some(_) => {
                writeln!(self.output, "Only the administrator can do that.")?;
                Ok(None)
            }
            None => {
                writeln!(self.output, "Please log in first.")?;
                Ok(None)
            }
        }
    }

    fn login(&mut self) -> Result<()> {
        let username = self.prompt("Enter username: ")?;
        let roll = self.prompt("Enter roll number: ")?;
        let mobile = self.prompt("Enter mobile number: ")?;

        match self.state.ledger.register_or_login(&username, &roll, &mobile)? {
            LoginResult::Registered => {
                writeln!(self.output, "User '{}' registered successfully.", username)?
            }
            LoginResult::ReturningUser => writeln!(self.output, "Welcome back, {}!", username)?,
        }
        self.state.set_current_user(Some(username));
        Ok(())
    }

    fn sell(&mut self) -> Result<()> {
        let Some(username) = self.require_login(LedgerAction::Sell)? else {
            return Ok(());
        };

        let hall = self.prompt_hall()?;
        let meal_type = self.prompt_meal_type()?;
        let tokens = parse_token_count(&self.prompt("Enter number of tokens to sell: ")?)?;

        let entered = self.prompt("Enter timestamp (DD/MM/YY hh:mm AM/PM, blank for now): ")?;
        let at = if entered.is_empty() {
            self.state.now()
        } else {
            match parse_timestamp(&entered) {
                Ok(at) => at,
                Err(_) => {
                    writeln!(
                        self.output,
                        "Invalid format! Please enter in DD/MM/YY hh:mm AM/PM format."
                    )?;
                    return Ok(());
                }
            }
        };

        let offer = self.state.ledger.sell(&username, hall, meal_type, tokens, at)?;
        writeln!(
            self.output,
            "{} {} tokens added to {} by {} at {}.",
            offer.tokens,
            offer.meal_type,
            hall,
            offer.seller,
            format_timestamp(&offer.created_at)
        )?;
        Ok(())
    }

    fn display(&mut self) -> Result<()> {
        if self.require_login(LedgerAction::ViewListings)?.is_none() {
            return Ok(());
        }
        let now = self.state.now();
        let listings = self.state.ledger.listings(now)?;

        writeln!(self.output, "\n--- Available Tokens in Halls ---")?;
        for listing in &listings {
            self.render_listing(listing)?;
        }
        Ok(())
    }

    fn render_listing(&mut self, listing: &HallListing) -> Result<()> {
        writeln!(self.output, "\n {}:", listing.hall)?;
        if listing.offers.is_empty() {
            writeln!(self.output, "   No valid tokens available.")?;
            return Ok(());
        }
        for (i, offer) in listing.offers.iter().enumerate() {
            writeln!(
                self.output,
                "  {}. {} {} tokens - Seller: {} at {}",
                i + 1,
                offer.tokens,
                offer.meal_type,
                offer.seller,
                format_timestamp(&offer.created_at)
            )?;
        }
        Ok(())
    }

    fn buy(&mut self) -> Result<()> {
        if self.require_login(LedgerAction::Buy)?.is_none() {
            return Ok(());
        }

        let hall = self.prompt_hall()?;
        let meal_type = self.prompt_meal_type()?;
        let requested = parse_token_count(&self.prompt("Enter number of tokens to buy: ")?)?;

        let now = self.state.now();
        let result = self.state.ledger.match_buy(hall, meal_type, requested, now)?;
        self.render_match(&result)
    }

    fn render_match(&mut self, result: &MatchResult) -> Result<()> {
        writeln!(
            self.output,
            "{} {} tokens reserved in {}. Contact the seller(s) for further details:",
            result.total_tokens(),
            result.meal_type,
            result.hall
        )?;
        for item in &result.line_items {
            self.render_line_item(item)?;
        }
        writeln!(self.output, "Please contact the seller(s) to complete the transaction.")?;
        Ok(())
    }

    fn render_line_item(&mut self, item: &LineItem) -> Result<()> {
        writeln!(self.output, "  Seller: {}", item.seller)?;
        match &item.contact {
            Some(contact) => {
                writeln!(self.output, "    Roll: {}", contact.roll)?;
                writeln!(self.output, "    Mobile: {}", contact.mobile)?;
            }
            None => writeln!(self.output, "    (no contact details on file)")?,
        }
        writeln!(self.output, "    Tokens: {}", item.tokens)?;
        Ok(())
    }

    fn buy_from_seller(&mut self) -> Result<()> {
        let Some(buyer) = self.require_login(LedgerAction::Buy)? else {
            return Ok(());
        };

        let hall = self.prompt_hall()?;
        let now = self.state.now();
        let listings = self.state.ledger.listings(now)?;
        if let Some(listing) = listings.iter().find(|l| l.hall == hall) {
            self.render_listing(listing)?;
        }

        let answer = self.prompt(&format!("Enter the seller index for {}: ", hall))?;
        let Ok(index) = answer.parse::<usize>() else {
            writeln!(self.output, "Invalid input. Please enter a valid number.")?;
            return Ok(());
        };

        let item = self.state.ledger.claim_offer(&buyer, hall, index, now)?;
        writeln!(self.output, "Contact {} for tokens:", item.seller)?;
        self.render_line_item(&item)
    }

    fn remove_user(&mut self) -> Result<()> {
        if self.require_login(LedgerAction::RemoveUser)?.is_none() {
            return Ok(());
        }

        let users: Vec<String> = self
            .state
            .ledger
            .users()
            .map(|(name, _)| name.to_string())
            .collect();
        writeln!(self.output, "Registered users: {}", users.join(", "))?;

        let username = self.prompt("Enter username to remove: ")?;
        let offers = self.state.ledger.remove_user(&username)?;
        writeln!(
            self.output,
            "User '{}' has been removed ({} offer(s) withdrawn).",
            username, offers
        )?;
        Ok(())
    }

    fn reset_users(&mut self) -> Result<()> {
        if self.require_login(LedgerAction::ResetUsers)?.is_none() {
            return Ok(());
        }

        let confirm = self.prompt("Type YES to erase all users and offers: ")?;
        if confirm != "YES" {
            writeln!(self.output, "Reset cancelled.")?;
            return Ok(());
        }

        let count = self.state.ledger.reset_users()?;
        self.state.set_current_user(None);
        writeln!(self.output, "All users have been erased ({} removed).", count)?;
        Ok(())
    }

    fn logout(&mut self) -> Result<()> {
        match self.state.current_user() {
            Some(user) => writeln!(self.output, "Goodbye, {}.", user)?,
            None => writeln!(self.output, "Nobody is logged in.")?,
        }
        self.state.set_current_user(None);
        Ok(())
    }
}
