/// Command-line interface for the intraoral scanner reservation system.
///
/// Patients can view open slots, reserve one and send cancellation
/// requests. The admin panel, behind a passphrase, lists and deletes
/// cancellation requests and removes booked appointments.

mod auth;
mod clinic;
mod config;
mod error;
mod models;
mod planner;
mod store;

use anyhow::{Context, Result};
use auth::{CredentialCheck, StaticPassphrase};
use chrono::{Local, NaiveDate, NaiveDateTime};
use clinic::ClinicBook;
use config::ClinicConfig;
use models::ClinicDay;
use std::io::{self, BufRead, Write};
use store::{CsvStore, Store};
use tracing_subscriber::EnvFilter;

/// Menu choice that leaves a picker without acting.
const BACK: usize = 0;

const RESERVE_DEFAULT_CHOICE: usize = 1;

/// The slot behind a 1-based menu number; `BACK` or out of range picks nothing.
fn slot_at(slots: &[NaiveDateTime], choice: usize) -> Option<NaiveDateTime> {
    choice.checked_sub(1).and_then(|i| slots.get(i)).copied()
}

struct ReservationCLI<S: Store, C: CredentialCheck> {
    book: ClinicBook<S>,
    credentials: C,
    running: bool,
}

impl<S: Store, C: CredentialCheck> ReservationCLI<S, C> {
    fn new(book: ClinicBook<S>, credentials: C) -> Self {
        ReservationCLI {
            book,
            credentials,
            running: true,
        }
    }

    fn print_header(&self) {
        println!("\n{}", "=".repeat(60));
        println!("  Welcome to Intraoral Scanner Reservation System");
        println!("{}", "=".repeat(60));
    }

    fn print_menu(&self) {
        println!("\n--- Main Menu ---");
        println!("1. View current appointments");
        println!("2. Reserve an appointment");
        println!("3. Send cancellation request");
        println!("4. Admin access");
        println!("5. Exit");
        println!("{}", "-".repeat(20));
    }

    /// Read one line. End of input stops the session.
    fn get_input(&mut self, prompt: &str, default: Option<&str>) -> Result<String> {
        if let Some(def) = default {
            print!("{} [{}]: ", prompt, def);
        } else {
            print!("{}: ", prompt);
        }
        io::stdout().flush().context("failed to flush stdout")?;

        let mut input = String::new();
        let read = io::stdin()
            .lock()
            .read_line(&mut input)
            .context("failed to read stdin")?;
        if read == 0 {
            self.running = false;
        }
        let input = input.trim();

        if input.is_empty() {
            Ok(default.unwrap_or("").to_string())
        } else {
            Ok(input.to_string())
        }
    }

    fn get_int_input(&mut self, prompt: &str, default: Option<usize>) -> Result<usize> {
        loop {
            let default_str = default.map(|d| d.to_string());
            let input = self.get_input(prompt, default_str.as_deref())?;

            if let Ok(value) = input.parse::<usize>() {
                return Ok(value);
            }
            if !self.running {
                return Ok(0);
            }
            println!("Please enter a valid number");
        }
    }

    fn get_date_input(&mut self, prompt: &str) -> Result<Option<NaiveDate>> {
        let today = Local::now().date_naive().format("%Y-%m-%d").to_string();
        let input = self.get_input(prompt, Some(&today))?;

        match NaiveDate::parse_from_str(&input, "%Y-%m-%d") {
            Ok(date) => Ok(Some(date)),
            Err(_) => {
                println!("Please enter a date as YYYY-MM-DD");
                Ok(None)
            }
        }
    }

    /// Pick one of `slots` by its 1-based number. 0 goes back.
    fn pick_slot(
        &mut self,
        prompt: &str,
        slots: &[NaiveDateTime],
        default: usize,
    ) -> Result<Option<NaiveDateTime>> {
        for (i, slot) in slots.iter().enumerate() {
            println!("  {}. {}", i + 1, slot.format("%H:%M"));
        }
        let choice = self.get_int_input(prompt, Some(default))?;
        Ok(slot_at(slots, choice))
    }

    fn view_appointments(&self) {
        println!("\n--- Current Appointments ---");
        for day in ClinicDay::ALL {
            let appointments = self.book.appointments_for(day);
            if appointments.is_empty() {
                println!("\n{}: No appointments reserved.", day);
                continue;
            }

            println!("\n{}:", day);
            for apt in appointments {
                println!(
                    "  - {} at {} (Name: {}, Contact: {})",
                    apt.start_time.format("%Y-%m-%d"),
                    apt.start_time.format("%H:%M"),
                    apt.patient_name,
                    apt.contact
                );
            }
        }
    }

    fn reserve_appointment(&mut self) -> Result<()> {
        println!("\n--- Reserve Appointment ---");

        let Some(date) = self.get_date_input("Select a date")? else {
            return Ok(());
        };
        let Some(day) = ClinicDay::from_date(date) else {
            println!("\nThe clinic is open only on Tuesdays and Thursdays.");
            return Ok(());
        };

        match self.book.is_full(date) {
            Ok(true) => {
                println!("\nMaximum number of appointments reached for this day.");
                return Ok(());
            }
            Ok(false) => {}
            Err(e) => {
                println!("\n{}", e);
                return Ok(());
            }
        }

        let slots = match self.book.available_slots(date) {
            Ok(slots) if !slots.is_empty() => slots,
            Ok(_) => {
                println!("\nNo available slots on {}, {}.", day, date);
                return Ok(());
            }
            Err(e) => {
                println!("\n{}", e);
                return Ok(());
            }
        };

        let name = self.get_input("Enter your name", None)?;
        let contact = self.get_input("Enter your contact number", None)?;

        println!("\nAvailable slots for {}, {}:", day, date);
        let Some(slot) = self.pick_slot("Select a time to reserve", &slots, RESERVE_DEFAULT_CHOICE)? else {
            println!("\nInvalid choice");
            return Ok(());
        };

        match self.book.reserve(date, slot, &name, &contact) {
            Ok(apt) => println!(
                "\nAppointment reserved for {} on {} at {}.",
                apt.patient_name,
                date.format("%Y-%m-%d"),
                apt.start_time.format("%H:%M")
            ),
            Err(e) => println!("\n{}", e),
        }
        Ok(())
    }

    fn send_cancellation_request(&mut self) -> Result<()> {
        println!("\n--- Cancellation Request ---");
        let message = self.get_input(
            "Please enter your cancellation message (add your name, your contact number and any other comments)",
            None,
        )?;

        match self.book.submit_cancellation(&message) {
            Ok(()) => println!("\nYour cancellation request has been sent."),
            Err(e) => println!("\n{}", e),
        }
        Ok(())
    }

    fn admin_panel(&mut self) -> Result<()> {
        let secret = self.get_input("Enter admin password", None)?;
        if !self.credentials.authenticate(&secret) {
            tracing::warn!("Rejected admin login attempt");
            println!("\nAccess denied");
            return Ok(());
        }

        while self.running {
            println!("\n--- Admin Panel ---");
            println!("1. List cancellation requests");
            println!("2. Delete cancellation request");
            println!("3. Remove appointment");
            println!("4. Back");

            match self.get_int_input("Enter choice", Some(4))? {
                1 => self.list_cancellation_requests(),
                2 => self.delete_cancellation_request()?,
                3 => self.remove_appointment()?,
                4 => break,
                _ => println!("Invalid choice"),
            }
        }
        Ok(())
    }

    fn list_cancellation_requests(&self) {
        println!("\n### Cancellation Requests:");
        let requests = self.book.cancellations();
        if requests.is_empty() {
            println!("No cancellation requests.");
            return;
        }
        for (i, request) in requests.iter().enumerate() {
            println!("{}. {}", i + 1, request);
        }
    }

    fn delete_cancellation_request(&mut self) -> Result<()> {
        self.list_cancellation_requests();
        if self.book.cancellations().is_empty() {
            return Ok(());
        }

        let choice = self.get_int_input("Delete request number (0 to go back)", Some(BACK))?;
        if choice == BACK {
            return Ok(());
        }

        match self.book.delete_cancellation(choice - 1) {
            Ok(_) => println!("\nCancellation request deleted."),
            Err(e) => println!("\n{}", e),
        }
        Ok(())
    }

    fn remove_appointment(&mut self) -> Result<()> {
        println!("\n### Remove Appointment");

        let Some(date) = self.get_date_input("Select a date to remove appointment")? else {
            return Ok(());
        };

        let slots = match self.book.booked_slots(date) {
            Ok(slots) => slots,
            Err(e) => {
                println!("\n{}", e);
                return Ok(());
            }
        };
        if slots.is_empty() {
            println!("\nNo appointments booked on {}.", date);
            return Ok(());
        }

        let Some(slot) = self.pick_slot("Select a slot to remove (0 to go back)", &slots, BACK)? else {
            return Ok(());
        };

        match self.book.remove_appointment(date, slot) {
            Ok(apt) => println!(
                "\nRemoved appointment on {} at {}.",
                apt.day,
                apt.start_time.format("%H:%M")
            ),
            Err(e) => println!("\n{}", e),
        }
        Ok(())
    }

    fn run(&mut self) -> Result<()> {
        self.print_header();
        if self.book.dropped_rows() > 0 {
            println!(
                "\nNote: {} stored rows could not be read and were skipped.",
                self.book.dropped_rows()
            );
        }
        self.view_appointments();

        while self.running {
            self.print_menu();

            let choice = self.get_int_input("Enter choice", Some(1))?;
            if !self.running {
                break;
            }

            match choice {
                1 => self.view_appointments(),
                2 => self.reserve_appointment()?,
                3 => self.send_cancellation_request()?,
                4 => self.admin_panel()?,
                5 => self.running = false,
                _ => println!("Invalid choice"),
            }
        }

        println!("\nGoodbye!");
        Ok(())
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let config = ClinicConfig::from_env();
    let credentials = StaticPassphrase::new(config.admin_passphrase.clone());
    if !credentials.is_configured() {
        tracing::warn!(
            "{} is not set, admin access is disabled",
            config::ADMIN_PASSPHRASE_VAR
        );
    }

    let store = CsvStore::new(&config.appointments_file, &config.cancellations_file);
    let book = ClinicBook::open(store).context("failed to load clinic data")?;

    ReservationCLI::new(book, credentials).run()
}
