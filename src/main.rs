use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};

use school_admin::api::ApiClient;
use school_admin::calc::ledger::Change;
use school_admin::calc::{dashboard, parse_assignment, Dashboard, DraftField, FeeDraft};
use school_admin::challan::generate_challans;
use school_admin::config::{config_dir, init_config_dir, load_config, resolve_path, Config};
use school_admin::dates::{month_label, parse_record_date, YearMonth};
use school_admin::diagnostics::{Diagnostic, Diagnostics};
use school_admin::error::{Result, SchoolError};
use school_admin::filter::{
    DateRange, Exact, ExpenseCriteria, FeeCriteria, NumRange, PaymentCriteria,
    StudentCriteria, TeacherCriteria, TextFilter, TriState,
};
use school_admin::models::{
    ChargeKind, Expense, ExpenseCategory, ExpenseInput, FeeGeneration, GenerateTeacherPay,
    Student, StudentFee, StudentInput, Teacher, TeacherInput, TeacherPayment, TeacherPaymentInput,
};
use school_admin::money::Money;
use school_admin::view::ListView;

#[derive(Parser)]
#[command(name = "school")]
#[command(version, about = "School administration client: students, staff, fees and ledger", long_about = None)]
struct Cli {
    /// Path to config directory (default: XDG config dir or ~/.school-admin)
    #[arg(short = 'C', long, global = true)]
    config_dir: Option<PathBuf>,

    /// Backend base URL for this invocation (overrides config.toml)
    #[arg(long, global = true, value_name = "URL")]
    api_url: Option<String>,

    /// Show requests and diagnostics (sets the default log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config directory with a template config.toml
    Init,

    /// Show the configuration in use
    Status,

    /// Student records
    #[command(subcommand)]
    Students(StudentCommand),

    /// Teacher records
    #[command(subcommand)]
    Teachers(TeacherCommand),

    /// Monthly teacher salary payments
    #[command(subcommand)]
    Payments(PaymentCommand),

    /// School expenses
    #[command(subcommand)]
    Expenses(ExpenseCommand),

    /// Monthly student fee records and challans
    #[command(subcommand)]
    Fees(FeeCommand),

    /// Financial overview from the monthly ledger
    Dashboard {
        /// Months shown in the trend table
        #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u8).range(1..=12))]
        months: u8,
    },
}

#[derive(Subcommand)]
enum StudentCommand {
    /// List students (filters are applied locally)
    List {
        #[command(flatten)]
        filters: StudentFilters,
    },
    /// Show one student
    Show { roll_no: i64 },
    /// Register a student
    Add {
        #[command(flatten)]
        fields: StudentFields,
    },
    /// Change some fields of a student
    Update {
        roll_no: i64,
        #[command(flatten)]
        fields: StudentFields,
    },
    /// Delete a student
    Delete { roll_no: i64 },
}

#[derive(Subcommand)]
enum TeacherCommand {
    /// List teachers (filters are applied locally)
    List {
        #[command(flatten)]
        filters: TeacherFilters,
    },
    /// Hire a teacher
    Add {
        #[command(flatten)]
        fields: TeacherFields,
    },
    /// Change some fields of a teacher
    Update {
        id: i64,
        #[command(flatten)]
        fields: TeacherFields,
    },
    /// Delete a teacher
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum PaymentCommand {
    /// List salary payments
    List {
        /// Only this teacher id
        #[arg(long)]
        teacher: Option<i64>,
        /// Only this month (YYYY-MM)
        #[arg(long, value_parser = parse_month)]
        month: Option<YearMonth>,
        #[arg(long, value_enum)]
        status: Option<PayStatus>,
    },
    /// Create payment rows for every enrolled teacher
    Generate {
        /// Month to generate (YYYY-MM)
        #[arg(long, value_parser = parse_month)]
        month: YearMonth,
    },
    /// Record one payment by hand
    Add {
        #[arg(long)]
        teacher: i64,
        /// Month paid for (YYYY-MM)
        #[arg(long, value_parser = parse_month)]
        month: YearMonth,
        /// Amount (default: the teacher's current pay)
        #[arg(long, value_parser = parse_money)]
        pay: Option<Money>,
        #[arg(long)]
        paid: bool,
    },
    /// Change a payment; unset flags keep their stored value
    Edit {
        id: i64,
        #[arg(long)]
        teacher: Option<i64>,
        #[arg(long, value_parser = parse_month)]
        month: Option<YearMonth>,
        #[arg(long, value_parser = parse_money)]
        pay: Option<Money>,
        #[arg(long, value_enum)]
        status: Option<PayStatus>,
    },
    /// Mark a payment as paid
    MarkPaid {
        id: i64,
        /// Mark as pending instead
        #[arg(long)]
        unpaid: bool,
    },
    /// Delete a payment
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum ExpenseCommand {
    /// List expenses (filters are applied locally)
    List {
        #[command(flatten)]
        filters: ExpenseFilters,
    },
    /// Record an expense
    Add {
        #[arg(long, value_parser = parse_category)]
        category: ExpenseCategory,
        #[arg(long, value_parser = parse_money)]
        amount: Money,
        /// Expense date (default: today)
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Change an expense; unset flags keep their stored value
    Edit {
        id: i64,
        #[arg(long, value_parser = parse_category)]
        category: Option<ExpenseCategory>,
        #[arg(long, value_parser = parse_money)]
        amount: Option<Money>,
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete an expense
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum FeeCommand {
    /// List fee records (filters are applied locally)
    List {
        #[command(flatten)]
        filters: FeeFilters,
    },
    /// Create a fee record for a student; their pending balance is carried forward
    Add {
        /// Student roll number
        #[arg(long)]
        student: i64,
        #[command(flatten)]
        edits: FeeEdits,
    },
    /// Edit a fee record; totals are recomputed before saving
    Edit {
        id: i64,
        #[command(flatten)]
        edits: FeeEdits,
        /// Override the paid flag after recomputing
        #[arg(long, value_enum)]
        paid: Option<YesNo>,
    },
    /// Compute a fee total and balance without saving
    Calc {
        #[command(flatten)]
        edits: FeeEdits,
    },
    /// Create fee records for every enrolled student
    Generate {
        /// Billing month (any date in the month)
        #[arg(long, value_parser = parse_date)]
        month: NaiveDate,
        #[arg(long, value_parser = parse_money, default_value = "0")]
        exam: Money,
        #[arg(long, value_parser = parse_money, default_value = "0")]
        ac: Money,
        #[arg(long, value_parser = parse_money, default_value = "0")]
        stationary: Money,
        #[arg(long, value_parser = parse_money, default_value = "0")]
        lab: Money,
    },
    /// Generate fee challan PDFs for selected records
    Challan {
        /// Fee record ids, in the order the challans should be produced
        ids: Vec<i64>,
        /// Select every record matching the filters
        #[arg(long)]
        all: bool,
        #[command(flatten)]
        filters: FeeFilters,
        /// Output directory (default: [challan].output_dir)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
        /// Open generated PDFs with the system default viewer
        #[arg(long)]
        open: bool,
    },
    /// Delete a fee record
    Delete { id: i64 },
}

#[derive(Clone, Copy, ValueEnum)]
enum YesNo {
    Yes,
    No,
}

impl YesNo {
    fn as_bool(self) -> bool {
        matches!(self, YesNo::Yes)
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum PayStatus {
    Paid,
    Pending,
}

fn tri(value: Option<YesNo>) -> TriState {
    value.map(YesNo::as_bool).into()
}

fn status_tri(value: Option<PayStatus>) -> TriState {
    value.map(|s| matches!(s, PayStatus::Paid)).into()
}

fn parse_money(s: &str) -> std::result::Result<Money, String> {
    Money::parse(s).ok_or_else(|| format!("'{s}' is not an amount"))
}

fn parse_date(s: &str) -> std::result::Result<NaiveDate, String> {
    parse_record_date(s).ok_or_else(|| format!("'{s}' is not a date (use YYYY-MM-DD or M/D/YYYY)"))
}

fn parse_month(s: &str) -> std::result::Result<YearMonth, String> {
    s.parse::<YearMonth>().map_err(|e| e.to_string())
}

fn parse_category(s: &str) -> std::result::Result<ExpenseCategory, String> {
    s.parse::<ExpenseCategory>().map_err(|e| e.to_string())
}

#[derive(Args)]
struct StudentFilters {
    /// Name contains (case-insensitive)
    #[arg(long)]
    name: Option<String>,
    /// Father's name contains
    #[arg(long)]
    father_name: Option<String>,
    #[arg(long)]
    grade: Option<i32>,
    /// Contact number contains
    #[arg(long)]
    contact: Option<String>,
    #[arg(long, value_enum)]
    enrolled: Option<YesNo>,
    /// Has a scanned document
    #[arg(long, value_enum)]
    has_doc: Option<YesNo>,
    #[arg(long, value_parser = parse_money)]
    min_tuition: Option<Money>,
    #[arg(long, value_parser = parse_money)]
    max_tuition: Option<Money>,
    #[arg(long, value_parser = parse_money)]
    min_security: Option<Money>,
    #[arg(long, value_parser = parse_money)]
    max_security: Option<Money>,
    #[arg(long, value_parser = parse_money)]
    min_admission: Option<Money>,
    #[arg(long, value_parser = parse_money)]
    max_admission: Option<Money>,
    #[arg(long, value_parser = parse_money)]
    min_pending: Option<Money>,
    #[arg(long, value_parser = parse_money)]
    max_pending: Option<Money>,
}

impl StudentFilters {
    fn criteria(&self) -> StudentCriteria {
        StudentCriteria {
            name: TextFilter::from_opt(self.name.as_deref()),
            father_name: TextFilter::from_opt(self.father_name.as_deref()),
            grade: Exact::new(self.grade),
            contact: TextFilter::from_opt(self.contact.as_deref()),
            enrolled: tri(self.enrolled),
            has_document: tri(self.has_doc),
            tuition: NumRange::new(self.min_tuition, self.max_tuition),
            security: NumRange::new(self.min_security, self.max_security),
            admission: NumRange::new(self.min_admission, self.max_admission),
            pending: NumRange::new(self.min_pending, self.max_pending),
        }
    }
}

#[derive(Args)]
struct StudentFields {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    father_name: Option<String>,
    #[arg(long)]
    grade: Option<i32>,
    #[arg(long)]
    contact: Option<String>,
    /// Date of birth (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    dob: Option<NaiveDate>,
    #[arg(long, value_parser = parse_date)]
    admission_date: Option<NaiveDate>,
    #[arg(long)]
    address: Option<String>,
    #[arg(long, value_parser = parse_money)]
    tuition_fee: Option<Money>,
    #[arg(long, value_parser = parse_money)]
    security_fee: Option<Money>,
    #[arg(long, value_parser = parse_money)]
    admission_fee: Option<Money>,
    #[arg(long, value_parser = parse_money)]
    pending_fee: Option<Money>,
    #[arg(long, value_enum)]
    enrolled: Option<YesNo>,
    /// Scanned admission form to upload
    #[arg(long, value_name = "FILE")]
    doc: Option<PathBuf>,
}

impl StudentFields {
    fn input(&self) -> StudentInput {
        StudentInput {
            name: self.name.clone(),
            father_name: self.father_name.clone(),
            grade: self.grade,
            contact: self.contact.clone(),
            dob: self.dob.map(|d| d.format("%Y-%m-%d").to_string()),
            admission_date: self.admission_date.map(|d| d.format("%Y-%m-%d").to_string()),
            address: self.address.clone(),
            tuition_fee: self.tuition_fee,
            security_fee: self.security_fee,
            admission_fee: self.admission_fee,
            pending_fee: self.pending_fee,
            enrolled: self.enrolled.map(YesNo::as_bool),
            document: self.doc.clone(),
        }
    }
}

#[derive(Args)]
struct TeacherFilters {
    /// Name contains (case-insensitive)
    #[arg(long)]
    name: Option<String>,
    /// Exact qualification, e.g. MSc
    #[arg(long)]
    qualification: Option<String>,
    #[arg(long, value_enum)]
    enrolled: Option<YesNo>,
    /// Has an uploaded document
    #[arg(long, value_enum)]
    has_doc: Option<YesNo>,
    #[arg(long, value_parser = parse_money)]
    min_pay: Option<Money>,
    #[arg(long, value_parser = parse_money)]
    max_pay: Option<Money>,
}

impl TeacherFilters {
    fn criteria(&self) -> TeacherCriteria {
        TeacherCriteria {
            name: TextFilter::from_opt(self.name.as_deref()),
            qualification: Exact::new(self.qualification.clone()),
            enrolled: tri(self.enrolled),
            pay: NumRange::new(self.min_pay, self.max_pay),
            has_document: tri(self.has_doc),
        }
    }
}

#[derive(Args)]
struct TeacherFields {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    contact: Option<String>,
    /// National identity card number
    #[arg(long)]
    cnic: Option<String>,
    #[arg(long)]
    qualification: Option<String>,
    /// Monthly salary
    #[arg(long, value_parser = parse_money)]
    pay: Option<Money>,
    #[arg(long, value_enum)]
    enrolled: Option<YesNo>,
    /// CV or contract to upload
    #[arg(long, value_name = "FILE")]
    doc: Option<PathBuf>,
}

impl TeacherFields {
    /// Flags given on the command line, falling back to the stored teacher.
    /// Teacher updates replace the whole record.
    fn input(&self, existing: Option<&Teacher>) -> TeacherInput {
        TeacherInput {
            name: self.name.clone().or_else(|| existing.map(|t| t.name.clone())),
            contact: self.contact.clone().or_else(|| existing.map(|t| t.contact.clone())),
            cnic: self.cnic.clone().or_else(|| existing.map(|t| t.cnic.clone())),
            qualification: self
                .qualification
                .clone()
                .or_else(|| existing.map(|t| t.qualification.clone())),
            pay: self.pay.or(existing.map(|t| t.pay)),
            enrolled: self
                .enrolled
                .map(YesNo::as_bool)
                .or(existing.map(|t| t.enrolled)),
            document: self.doc.clone(),
        }
    }
}

#[derive(Args)]
struct ExpenseFilters {
    /// On or after this date
    #[arg(long, value_parser = parse_date)]
    from: Option<NaiveDate>,
    /// On or before this date (whole day included)
    #[arg(long, value_parser = parse_date)]
    to: Option<NaiveDate>,
    #[arg(long, value_parser = parse_category)]
    category: Option<ExpenseCategory>,
    #[arg(long, value_parser = parse_money)]
    min_amount: Option<Money>,
    #[arg(long, value_parser = parse_money)]
    max_amount: Option<Money>,
    /// Description contains
    #[arg(long)]
    search: Option<String>,
}

impl ExpenseFilters {
    fn criteria(&self) -> ExpenseCriteria {
        ExpenseCriteria {
            date: DateRange::new(self.from, self.to),
            category: Exact::new(self.category),
            amount: NumRange::new(self.min_amount, self.max_amount),
            description: TextFilter::from_opt(self.search.as_deref()),
        }
    }
}

#[derive(Args)]
struct FeeFilters {
    #[arg(long, value_enum)]
    status: Option<PayStatus>,
    /// Billing month (YYYY-MM)
    #[arg(long, value_parser = parse_month)]
    month: Option<YearMonth>,
    /// Student name, roll number or grade contains
    #[arg(long)]
    search: Option<String>,
}

impl FeeFilters {
    fn criteria(&self) -> FeeCriteria {
        FeeCriteria {
            paid: status_tri(self.status),
            month: self.month,
            search: TextFilter::from_opt(self.search.as_deref()),
        }
    }
}

#[derive(Args)]
struct FeeEdits {
    /// Charge to set, e.g. exam_fee=500 (repeatable)
    #[arg(short, long = "set", value_name = "FIELD=VALUE")]
    set: Vec<String>,
    #[arg(long, value_parser = parse_money)]
    amount_paid: Option<Money>,
    #[arg(long)]
    description: Option<String>,
    /// Billing month (any date in the month)
    #[arg(long, value_parser = parse_date)]
    month: Option<NaiveDate>,
}

impl FeeEdits {
    fn apply(&self, draft: &mut FeeDraft) -> Result<()> {
        for assignment in &self.set {
            let (field, value) = parse_assignment(assignment)?;
            draft.set(field, &value);
        }
        if let Some(paid) = self.amount_paid {
            draft.set(DraftField::AmountPaid, &paid.to_string());
        }
        if let Some(text) = &self.description {
            draft.set(DraftField::Description, text);
        }
        if let Some(month) = self.month {
            draft.set(DraftField::Month, &month.format("%Y-%m-%d").to_string());
        }
        Ok(())
    }
}

/// Loaded configuration plus a client for its backend.
struct Session {
    cfg_dir: PathBuf,
    config: Config,
    api: ApiClient,
}

impl Session {
    fn open(cfg_dir: &Path, api_url: Option<&str>) -> Result<Self> {
        let mut config = load_config(cfg_dir)?;
        if let Some(url) = api_url {
            config.api.base_url = url.to_string();
        }
        let api = ApiClient::new(&config.api);
        log::debug!("using backend {}", api.base_url());
        Ok(Self {
            cfg_dir: cfg_dir.to_path_buf(),
            config,
            api,
        })
    }

    fn money(&self, amount: Money) -> String {
        format!("{} {}", self.config.school.currency_symbol, amount.grouped())
    }
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // Determine config directory
    let cfg_dir = match cli.config_dir {
        Some(p) => p,
        None => config_dir()?,
    };

    if let Commands::Init = cli.command {
        return cmd_init(&cfg_dir);
    }

    let session = Session::open(&cfg_dir, cli.api_url.as_deref())?;

    match cli.command {
        Commands::Init => Ok(()),
        Commands::Status => cmd_status(&session),
        Commands::Students(cmd) => match cmd {
            StudentCommand::List { filters } => cmd_students(&session, &filters),
            StudentCommand::Show { roll_no } => cmd_student_show(&session, roll_no),
            StudentCommand::Add { fields } => cmd_student_add(&session, &fields),
            StudentCommand::Update { roll_no, fields } => {
                let student = session.api.update_student(roll_no, &fields.input())?;
                println!("Updated student #{} ({})", student.roll_no, student.name);
                Ok(())
            }
            StudentCommand::Delete { roll_no } => {
                session.api.delete_student(roll_no)?;
                println!("Deleted student #{roll_no}");
                Ok(())
            }
        },
        Commands::Teachers(cmd) => match cmd {
            TeacherCommand::List { filters } => cmd_teachers(&session, &filters),
            TeacherCommand::Add { fields } => cmd_teacher_add(&session, &fields),
            TeacherCommand::Update { id, fields } => cmd_teacher_update(&session, id, &fields),
            TeacherCommand::Delete { id } => {
                session.api.delete_teacher(id)?;
                println!("Deleted teacher #{id}");
                Ok(())
            }
        },
        Commands::Payments(cmd) => match cmd {
            PaymentCommand::List {
                teacher,
                month,
                status,
            } => {
                let criteria = PaymentCriteria {
                    teacher: Exact::new(teacher),
                    month,
                    paid: status_tri(status),
                };
                cmd_payments(&session, criteria)
            }
            PaymentCommand::Generate { month } => {
                session.api.generate_teacher_payments(&GenerateTeacherPay {
                    month: month.first_day(),
                })?;
                println!("Generated teacher payments for {}", month.label());
                Ok(())
            }
            PaymentCommand::Add {
                teacher,
                month,
                pay,
                paid,
            } => cmd_payment_add(&session, teacher, month, pay, paid),
            PaymentCommand::Edit {
                id,
                teacher,
                month,
                pay,
                status,
            } => cmd_payment_edit(&session, id, teacher, month, pay, status),
            PaymentCommand::MarkPaid { id, unpaid } => cmd_mark_paid(&session, id, !unpaid),
            PaymentCommand::Delete { id } => {
                session.api.delete_teacher_payment(id)?;
                println!("Deleted payment #{id}");
                Ok(())
            }
        },
        Commands::Expenses(cmd) => match cmd {
            ExpenseCommand::List { filters } => cmd_expenses(&session, &filters),
            ExpenseCommand::Add {
                category,
                amount,
                date,
                description,
            } => {
                let date = date.unwrap_or_else(|| Local::now().date_naive());
                let expense = session.api.create_expense(&ExpenseInput {
                    category,
                    amount,
                    date: date.format("%Y-%m-%d").to_string(),
                    description,
                })?;
                println!(
                    "Recorded expense #{}: {} {}",
                    expense.id,
                    expense.category,
                    session.money(expense.amount)
                );
                Ok(())
            }
            ExpenseCommand::Edit {
                id,
                category,
                amount,
                date,
                description,
            } => cmd_expense_edit(&session, id, category, amount, date, description),
            ExpenseCommand::Delete { id } => {
                session.api.delete_expense(id)?;
                println!("Deleted expense #{id}");
                Ok(())
            }
        },
        Commands::Fees(cmd) => match cmd {
            FeeCommand::List { filters } => cmd_fees(&session, &filters),
            FeeCommand::Add { student, edits } => cmd_fee_add(&session, student, &edits),
            FeeCommand::Edit { id, edits, paid } => cmd_fee_edit(&session, id, &edits, paid),
            FeeCommand::Calc { edits } => {
                let mut draft = FeeDraft::new(Local::now().date_naive());
                edits.apply(&mut draft)?;
                print_draft(&session, &draft);
                Ok(())
            }
            FeeCommand::Generate {
                month,
                exam,
                ac,
                stationary,
                lab,
            } => {
                session.api.generate_fees(&FeeGeneration {
                    month,
                    exam_fee: exam,
                    ac_charges: ac,
                    stationary_charges: stationary,
                    lab_charges: lab,
                })?;
                println!("Generated fee records for {}", YearMonth::of(month).label());
                Ok(())
            }
            FeeCommand::Challan {
                ids,
                all,
                filters,
                output_dir,
                open,
            } => cmd_challan(&session, &ids, all, &filters, output_dir, open),
            FeeCommand::Delete { id } => {
                session.api.delete_fee(id)?;
                println!("Deleted fee record #{id}");
                Ok(())
            }
        },
        Commands::Dashboard { months } => cmd_dashboard(&session, usize::from(months)),
    }
}

/// Initialize config directory with template files
fn cmd_init(cfg_dir: &Path) -> Result<()> {
    init_config_dir(cfg_dir)?;

    println!("Initialized school config at: {}", cfg_dir.display());
    println!();
    println!("Next steps:");
    println!(
        "  1. Point at your backend and set the school name:  $EDITOR {}/config.toml",
        cfg_dir.display()
    );
    println!("  2. Check the connection:  school students list");
    println!();
    println!("Challans are written to: {}", cfg_dir.join("challans").display());

    Ok(())
}

fn cmd_status(session: &Session) -> Result<()> {
    let config = &session.config;

    println!("School Admin Status");
    println!("{}", "-".repeat(50));
    println!("Config directory: {}", session.cfg_dir.display());
    println!("Backend:          {}", session.api.base_url());
    println!(
        "Auth token:       {}",
        if config.api.token.is_some() { "set" } else { "none" }
    );
    println!("School:           {}", config.school.name);
    println!("Currency:         {}", config.school.currency_symbol);
    println!(
        "Challan output:   {}",
        resolve_path(&config.challan.output_dir, &session.cfg_dir).display()
    );
    println!("Challan due in:   {} days", config.challan.due_days);
    match &config.school.logo {
        Some(logo) => {
            let path = resolve_path(logo, &session.cfg_dir);
            let state = if path.is_file() { "found" } else { "missing" };
            println!("Logo:             {} ({state})", path.display());
        }
        None => println!("Logo:             none"),
    }

    Ok(())
}

/// One line for records kept despite an unreadable date.
fn report_diagnostics(diagnostics: &Diagnostics) {
    let kept = diagnostics
        .iter()
        .filter(|d| matches!(d, Diagnostic::UnparseableDate { .. }))
        .count();
    if kept > 0 {
        println!("Kept {kept} record(s) with unreadable dates");
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

fn print_table<R: Tabled>(rows: Vec<R>) {
    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");
}

#[derive(Tabled)]
struct StudentRow {
    #[tabled(rename = "ROLL")]
    roll_no: i64,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "FATHER")]
    father_name: String,
    #[tabled(rename = "GRADE")]
    grade: i32,
    #[tabled(rename = "CONTACT")]
    contact: String,
    #[tabled(rename = "TUITION")]
    tuition: String,
    #[tabled(rename = "PENDING")]
    pending: String,
    #[tabled(rename = "ENROLLED")]
    enrolled: &'static str,
    #[tabled(rename = "DOC")]
    doc: &'static str,
}

fn cmd_students(session: &Session, filters: &StudentFilters) -> Result<()> {
    let view = ListView::new(session.api.list_students()?, filters.criteria());
    let total = view.records().len();

    if view.visible_len() == 0 {
        println!("No students match ({total} loaded).");
        return Ok(());
    }

    let rows: Vec<StudentRow> = view
        .visible()
        .into_iter()
        .map(|s| StudentRow {
            roll_no: s.roll_no,
            name: s.name.clone(),
            father_name: s.father_name.clone(),
            grade: s.grade,
            contact: s.contact.clone(),
            tuition: s.tuition_fee.grouped(),
            pending: s.pending_fee.grouped(),
            enrolled: yes_no(s.enrolled),
            doc: yes_no(s.has_document()),
        })
        .collect();
    print_table(rows);

    let summary = view.summary();
    println!();
    println!(
        "Showing {} of {} students ({} enrolled)",
        summary.count, total, summary.enrolled
    );
    println!("Pending fees: {}", session.money(summary.pending));
    Ok(())
}

fn cmd_student_show(session: &Session, roll_no: i64) -> Result<()> {
    let s: Student = session.api.get_student(roll_no)?;
    println!("Student #{}", s.roll_no);
    println!("{}", "-".repeat(50));
    println!("Name:           {}", s.name);
    println!("Father's name:  {}", s.father_name);
    println!("Grade:          {}", s.grade);
    println!("Contact:        {}", s.contact);
    println!("Date of birth:  {}", s.dob.as_deref().unwrap_or("-"));
    println!("Admitted:       {}", s.admission_date.as_deref().unwrap_or("-"));
    println!("Address:        {}", s.address);
    println!("Tuition fee:    {}", session.money(s.tuition_fee));
    println!("Security fee:   {}", session.money(s.security_fee));
    println!("Admission fee:  {}", session.money(s.admission_fee));
    println!("Pending fee:    {}", session.money(s.pending_fee));
    println!("Enrolled:       {}", yes_no(s.enrolled));
    println!(
        "Document:       {}",
        s.scanned_doc.as_deref().filter(|_| s.has_document()).unwrap_or("none")
    );
    Ok(())
}

fn require(value: Option<&str>, flag: &str) -> Result<()> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(()),
        _ => Err(SchoolError::invalid(flag, "", "this field is required")),
    }
}

fn cmd_student_add(session: &Session, fields: &StudentFields) -> Result<()> {
    require(fields.name.as_deref(), "--name")?;
    if fields.grade.is_none() {
        return Err(SchoolError::invalid("--grade", "", "this field is required"));
    }
    let student = session.api.create_student(&fields.input())?;
    println!("Added student #{} ({})", student.roll_no, student.name);
    Ok(())
}

#[derive(Tabled)]
struct TeacherRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "QUALIFICATION")]
    qualification: String,
    #[tabled(rename = "CONTACT")]
    contact: String,
    #[tabled(rename = "PAY")]
    pay: String,
    #[tabled(rename = "JOINED")]
    joined: String,
    #[tabled(rename = "ENROLLED")]
    enrolled: &'static str,
    #[tabled(rename = "DOC")]
    doc: &'static str,
}

fn cmd_teachers(session: &Session, filters: &TeacherFilters) -> Result<()> {
    let view = ListView::new(session.api.list_teachers()?, filters.criteria());
    let total = view.records().len();

    if view.visible_len() == 0 {
        println!("No teachers match ({total} loaded).");
        return Ok(());
    }

    let rows: Vec<TeacherRow> = view
        .visible()
        .into_iter()
        .map(|t| TeacherRow {
            id: t.id,
            name: t.name.clone(),
            qualification: t.qualification.clone(),
            contact: t.contact.clone(),
            pay: t.pay.grouped(),
            joined: t.joining_date.clone().unwrap_or_default(),
            enrolled: yes_no(t.enrolled),
            doc: yes_no(t.has_document()),
        })
        .collect();
    print_table(rows);

    let summary = view.summary();
    println!();
    println!(
        "Showing {} of {} teachers ({} enrolled)",
        summary.count, total, summary.enrolled
    );
    println!("Monthly payroll: {}", session.money(summary.payroll));
    Ok(())
}

fn cmd_teacher_add(session: &Session, fields: &TeacherFields) -> Result<()> {
    require(fields.name.as_deref(), "--name")?;
    let teacher = session.api.create_teacher(&fields.input(None))?;
    println!("Added teacher #{} ({})", teacher.id, teacher.name);
    Ok(())
}

fn cmd_teacher_update(session: &Session, id: i64, fields: &TeacherFields) -> Result<()> {
    let existing = session.api.get_teacher(id)?;
    let teacher = session.api.update_teacher(id, &fields.input(Some(&existing)))?;
    println!("Updated teacher #{} ({})", teacher.id, teacher.name);
    Ok(())
}

#[derive(Tabled)]
struct PaymentRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "TEACHER")]
    teacher: String,
    #[tabled(rename = "MONTH")]
    month: String,
    #[tabled(rename = "PAY")]
    pay: String,
    #[tabled(rename = "STATUS")]
    status: &'static str,
}

fn paid_label(paid: bool) -> &'static str {
    if paid {
        "PAID"
    } else {
        "PENDING"
    }
}

fn cmd_payments(session: &Session, criteria: PaymentCriteria) -> Result<()> {
    let names: HashMap<i64, String> = session
        .api
        .list_teachers()?
        .into_iter()
        .map(|t| (t.id, t.name))
        .collect();
    let view = ListView::new(session.api.list_teacher_payments()?, criteria);
    let total = view.records().len();

    if view.visible_len() == 0 {
        println!("No payments match ({total} loaded).");
        report_diagnostics(view.diagnostics());
        return Ok(());
    }

    let rows: Vec<PaymentRow> = view
        .visible()
        .into_iter()
        .map(|p: &TeacherPayment| PaymentRow {
            id: p.id,
            teacher: names
                .get(&p.teacher)
                .cloned()
                .unwrap_or_else(|| format!("#{}", p.teacher)),
            month: month_label(&p.month),
            pay: p.pay.grouped(),
            status: paid_label(p.paid),
        })
        .collect();
    print_table(rows);

    let summary = view.summary();
    println!();
    println!("Showing {} of {} payments", summary.count, total);
    println!("Total:   {}", session.money(summary.total));
    println!("Paid:    {}", session.money(summary.paid));
    println!("Pending: {}", session.money(summary.pending));
    report_diagnostics(view.diagnostics());
    Ok(())
}

fn cmd_mark_paid(session: &Session, id: i64, paid: bool) -> Result<()> {
    let mut input = TeacherPaymentInput::from_payment(&session.api.get_teacher_payment(id)?)?;
    input.paid = paid;
    let saved = session.api.update_teacher_payment(id, &input)?;
    println!(
        "Payment #{} for {} is now {}",
        saved.id,
        month_label(&saved.month),
        paid_label(saved.paid)
    );
    Ok(())
}

fn cmd_payment_add(
    session: &Session,
    teacher: i64,
    month: YearMonth,
    pay: Option<Money>,
    paid: bool,
) -> Result<()> {
    let pay = match pay {
        Some(pay) => pay,
        None => session.api.get_teacher(teacher)?.pay,
    };
    let input = TeacherPaymentInput::new(teacher, month.first_day(), pay, paid)?;
    let saved = session.api.create_teacher_payment(&input)?;
    println!(
        "Created payment #{} for teacher #{} ({}): {} {}",
        saved.id,
        saved.teacher,
        month_label(&saved.month),
        session.money(saved.pay),
        paid_label(saved.paid)
    );
    Ok(())
}

fn cmd_payment_edit(
    session: &Session,
    id: i64,
    teacher: Option<i64>,
    month: Option<YearMonth>,
    pay: Option<Money>,
    status: Option<PayStatus>,
) -> Result<()> {
    let stored = session.api.get_teacher_payment(id)?;
    let base = TeacherPaymentInput::from_payment(&stored)?;
    let input = TeacherPaymentInput::new(
        teacher.unwrap_or(base.teacher),
        month.map(|m| m.first_day()).unwrap_or(base.month),
        pay.unwrap_or(stored.pay),
        status.map_or(base.paid, |s| matches!(s, PayStatus::Paid)),
    )?;
    let saved = session.api.update_teacher_payment(id, &input)?;
    println!(
        "Updated payment #{}: teacher #{} ({}) {} {}",
        saved.id,
        saved.teacher,
        month_label(&saved.month),
        session.money(saved.pay),
        paid_label(saved.paid)
    );
    Ok(())
}

#[derive(Tabled)]
struct ExpenseRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "CATEGORY")]
    category: String,
    #[tabled(rename = "AMOUNT")]
    amount: String,
    #[tabled(rename = "DESCRIPTION")]
    description: String,
}

fn cmd_expense_edit(
    session: &Session,
    id: i64,
    category: Option<ExpenseCategory>,
    amount: Option<Money>,
    date: Option<NaiveDate>,
    description: Option<String>,
) -> Result<()> {
    let stored = session.api.get_expense(id)?;
    // Send ISO dates even when the stored one came back in slash form.
    let date = date
        .or_else(|| parse_record_date(&stored.date))
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or(stored.date);
    let saved = session.api.update_expense(
        id,
        &ExpenseInput {
            category: category.unwrap_or(stored.category),
            amount: amount.unwrap_or(stored.amount),
            date,
            description: description.or(stored.description),
        },
    )?;
    println!(
        "Updated expense #{}: {} {} on {}",
        saved.id,
        saved.category,
        session.money(saved.amount),
        saved.date
    );
    Ok(())
}

fn cmd_expenses(session: &Session, filters: &ExpenseFilters) -> Result<()> {
    let view = ListView::new(session.api.list_expenses()?, filters.criteria());
    let total = view.records().len();

    if view.visible_len() == 0 {
        println!("No expenses match ({total} loaded).");
        report_diagnostics(view.diagnostics());
        return Ok(());
    }

    let rows: Vec<ExpenseRow> = view
        .visible()
        .into_iter()
        .map(|e: &Expense| ExpenseRow {
            id: e.id,
            date: e.date.clone(),
            category: e.category.to_string(),
            amount: e.amount.grouped(),
            description: e.description.clone().unwrap_or_default(),
        })
        .collect();
    print_table(rows);

    let summary = view.summary();
    println!();
    println!("Showing {} of {} expenses", summary.count, total);
    println!("Total: {}", session.money(summary.total));
    report_diagnostics(view.diagnostics());
    Ok(())
}

#[derive(Tabled)]
struct FeeRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "ROLL")]
    roll_no: i64,
    #[tabled(rename = "STUDENT")]
    student: String,
    #[tabled(rename = "GRADE")]
    grade: i32,
    #[tabled(rename = "MONTH")]
    month: String,
    #[tabled(rename = "TOTAL")]
    total: String,
    #[tabled(rename = "RECEIVED")]
    amount_paid: String,
    #[tabled(rename = "BALANCE")]
    balance: String,
    #[tabled(rename = "STATUS")]
    status: &'static str,
}

fn fee_row(f: &StudentFee) -> FeeRow {
    FeeRow {
        id: f.id,
        roll_no: f.student_info.roll_no,
        student: f.student_info.name.clone(),
        grade: f.student_info.grade,
        month: month_label(&f.month),
        total: f.total_fee.grouped(),
        amount_paid: f.amount_paid.grouped(),
        balance: f.balance.grouped(),
        status: paid_label(f.paid),
    }
}

fn cmd_fees(session: &Session, filters: &FeeFilters) -> Result<()> {
    let view = ListView::new(session.api.list_fees()?, filters.criteria());
    let total = view.records().len();

    if view.visible_len() == 0 {
        println!("No fee records match ({total} loaded).");
        report_diagnostics(view.diagnostics());
        return Ok(());
    }

    let rows: Vec<FeeRow> = view.visible().into_iter().map(fee_row).collect();
    print_table(rows);

    let summary = view.summary();
    println!();
    println!("Showing {} of {} fee records", summary.count, total);
    println!("Total:   {}", session.money(summary.total));
    println!("Paid:    {}", session.money(summary.paid));
    println!("Pending: {}", session.money(summary.pending));
    report_diagnostics(view.diagnostics());
    Ok(())
}

#[derive(Tabled)]
struct ChargeRow {
    #[tabled(rename = "CHARGE")]
    label: &'static str,
    #[tabled(rename = "FIELD")]
    field: &'static str,
    #[tabled(rename = "AMOUNT")]
    amount: String,
}

fn print_draft(session: &Session, draft: &FeeDraft) {
    let rows: Vec<ChargeRow> = ChargeKind::ALL
        .into_iter()
        .map(|kind| ChargeRow {
            label: kind.label(),
            field: kind.field_name(),
            amount: draft.charges.get(kind).grouped(),
        })
        .collect();
    print_table(rows);
    println!();
    println!("Total:       {}", session.money(draft.total_fee));
    println!("Amount paid: {}", session.money(draft.amount_paid));
    println!("Balance:     {}", session.money(draft.balance));
    println!("Status:      {}", paid_label(draft.paid));
}

fn cmd_fee_add(session: &Session, roll_no: i64, edits: &FeeEdits) -> Result<()> {
    let student = session.api.get_student(roll_no)?;
    let mut draft = FeeDraft::new(Local::now().date_naive());
    draft.select_student(&student);
    edits.apply(&mut draft)?;

    let created = session.api.create_fee(&draft.submission()?)?;
    println!(
        "Created fee record #{} for {} ({})",
        created.id,
        student.name,
        month_label(&draft.month)
    );
    print_draft(session, &draft);
    Ok(())
}

fn cmd_fee_edit(session: &Session, id: i64, edits: &FeeEdits, paid: Option<YesNo>) -> Result<()> {
    let fee = session.api.get_fee(id)?;
    let mut draft = FeeDraft::from_fee(&fee);
    edits.apply(&mut draft)?;
    if let Some(paid) = paid {
        draft.set_paid(paid.as_bool());
    }

    let submission = draft.submission()?;
    session.api.update_fee(id, &submission)?;
    println!("Updated fee record #{id} ({})", fee.student_info.name);
    draft.total_fee = submission.total_fee;
    draft.balance = submission.balance;
    print_draft(session, &draft);
    Ok(())
}

fn cmd_challan(
    session: &Session,
    ids: &[i64],
    all: bool,
    filters: &FeeFilters,
    output_dir: Option<PathBuf>,
    open: bool,
) -> Result<()> {
    let mut view = ListView::new(session.api.list_fees()?, filters.criteria());
    if all {
        view.select_all(true);
    }
    let mut diagnostics = Diagnostics::new();
    for &id in ids {
        if !view.is_selected(id) && !view.toggle(id) {
            diagnostics.record(Diagnostic::SelectionSkipped { id: id.to_string() });
        }
    }
    if view.selected_ids().is_empty() && diagnostics.is_empty() {
        return Err(SchoolError::NothingSelected);
    }

    let output_dir = output_dir
        .unwrap_or_else(|| resolve_path(&session.config.challan.output_dir, &session.cfg_dir));

    let fees = view.selected_records(&mut diagnostics);
    let batch = generate_challans(
        fees,
        &session.config,
        &session.cfg_dir,
        &output_dir,
        &mut diagnostics,
    )?;

    for path in &batch.saved {
        println!("Saved: {}", path.display());
        if open {
            open_path(path)?;
        }
    }
    for (id, err) in &batch.failed {
        eprintln!("Failed: fee record #{id}: {err}");
    }
    let skipped = diagnostics
        .iter()
        .filter(|d| matches!(d, Diagnostic::SelectionSkipped { .. }))
        .count();
    let mut line = format!("Generated {} challan(s)", batch.saved.len());
    if skipped > 0 {
        line.push_str(&format!(", skipped {skipped} id(s) not in the list"));
    }
    if !batch.failed.is_empty() {
        line.push_str(&format!(", {} failed", batch.failed.len()));
    }
    println!("{line}");
    Ok(())
}

fn open_path(pdf_path: &Path) -> Result<()> {
    // Open with system default viewer
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(pdf_path)
            .spawn()
            .map_err(SchoolError::Io)?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(pdf_path)
            .spawn()
            .map_err(SchoolError::Io)?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .arg("/C")
            .arg("start")
            .arg("")
            .arg(pdf_path)
            .spawn()
            .map_err(SchoolError::Io)?;
    }
    Ok(())
}

#[derive(Tabled)]
struct KpiRow {
    #[tabled(rename = "METRIC")]
    metric: &'static str,
    #[tabled(rename = "CURRENT")]
    current: String,
    #[tabled(rename = "PREVIOUS")]
    previous: String,
    #[tabled(rename = "CHANGE")]
    change: String,
}

#[derive(Tabled)]
struct TrendRow {
    #[tabled(rename = "MONTH")]
    month: String,
    #[tabled(rename = "REVENUE")]
    revenue: String,
    #[tabled(rename = "EXPENSES")]
    expenses: String,
    #[tabled(rename = "PROFIT")]
    profit: String,
}

fn change_cell(change: &Change, has_previous: bool) -> String {
    if !has_previous {
        return "-".to_string();
    }
    let framing = if change.percent.is_zero() {
        ""
    } else if change.favorable {
        " (good)"
    } else {
        " (bad)"
    };
    format!("{change}{framing}")
}

fn cmd_dashboard(session: &Session, months: usize) -> Result<()> {
    let Some(board): Option<Dashboard> = dashboard(session.api.list_ledger()?, months) else {
        println!("No ledger entries yet.");
        return Ok(());
    };

    println!("Financial Dashboard: {}", month_label(&board.current.month));
    println!("{}", "-".repeat(50));

    let rows: Vec<KpiRow> = board
        .changes
        .iter()
        .map(|(metric, change)| KpiRow {
            metric: metric.label(),
            current: metric.value(&board.current).grouped(),
            previous: board
                .previous
                .as_ref()
                .map(|p| metric.value(p).grouped())
                .unwrap_or_else(|| "-".to_string()),
            change: change_cell(change, board.previous.is_some()),
        })
        .collect();
    print_table(rows);

    println!();
    println!("Health score:          {:.1} ({})", board.health, board.band);
    println!("Profit margin:         {:.1}%", board.margin);
    println!("Revenue/expense ratio: {}", board.ratio);

    println!();
    println!("Trend (last {} month(s))", board.trend.len());
    let trend: Vec<TrendRow> = board
        .trend
        .iter()
        .map(|p| TrendRow {
            month: p.month.clone(),
            revenue: p.revenue.grouped(),
            expenses: p.expenses.grouped(),
            profit: p.profit.grouped(),
        })
        .collect();
    print_table(trend);
    Ok(())
}
