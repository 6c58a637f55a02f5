//! Money transfer and bill payment between ledger-backed accounts.
//!
//! `Account` is plain data. The `MoneyTransfer` and `PayBills` contexts bind
//! accounts into roles through small role-contract traits, and the use-case
//! logic lives in methodful-role traits implemented on those role slots.

use std::sync::Arc;

use dci::context::context_ref;
use dci::dispatch::Executable;
use dci::engine::Engine;
use dci::errors::DciError;
use dci::role::Role;
use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, info};

/// Errors raised by account use cases.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountError {
    /// The paying account cannot cover every bill.
    #[error("Not enough money on account to pay all bills, {shortfall} more is needed")]
    InsufficientFunds {
        /// The missing amount.
        shortfall: i64,
    },

    /// The engine refused to run a context.
    #[error(transparent)]
    Engine(#[from] DciError),
}

/// A single line in an account ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    /// Description of the movement.
    pub message: String,
    /// Signed amount, in minor units.
    pub amount: i64,
}

impl LedgerEntry {
    /// Creates a ledger entry.
    #[must_use]
    pub fn new(message: impl Into<String>, amount: i64) -> Self {
        Self {
            message: message.into(),
            amount,
        }
    }
}

/// An account whose balance is the sum of its ledger.
#[derive(Debug, Default)]
pub struct Account {
    ledger: Mutex<Vec<LedgerEntry>>,
}

impl Account {
    /// Creates an account from existing ledger entries.
    #[must_use]
    pub fn new(entries: Vec<LedgerEntry>) -> Self {
        Self {
            ledger: Mutex::new(entries),
        }
    }

    /// Creates an account holding a single opening deposit.
    #[must_use]
    pub fn with_balance(amount: i64) -> Self {
        Self::new(vec![LedgerEntry::new("Opening balance", amount)])
    }

    /// Returns the current balance.
    pub fn balance(&self) -> i64 {
        self.ledger.lock().iter().map(|entry| entry.amount).sum()
    }

    /// Returns a copy of the ledger.
    pub fn ledger(&self) -> Vec<LedgerEntry> {
        self.ledger.lock().clone()
    }

    fn add_entry(&self, message: &str, amount: i64) {
        self.ledger.lock().push(LedgerEntry::new(message, amount));
    }
}

/// Role contract for the account money leaves from.
pub trait SourceAccount: Send + Sync {
    /// Takes `amount` out of the account.
    fn withdraw(&self, amount: i64);
}

/// Role contract for the account money arrives in.
pub trait DestinationAccount: Send + Sync {
    /// Puts `amount` into the account.
    fn deposit(&self, amount: i64);
}

impl SourceAccount for Account {
    fn withdraw(&self, amount: i64) {
        self.add_entry("Withdrawing", -amount);
    }
}

impl DestinationAccount for Account {
    fn deposit(&self, amount: i64) {
        self.add_entry("Depositing", amount);
    }
}

/// Transfers an amount from one account to another.
#[derive(Debug)]
pub struct MoneyTransfer {
    source: Role<dyn SourceAccount>,
    destination: Role<dyn DestinationAccount>,
    amount: i64,
}

impl MoneyTransfer {
    /// Binds the source, destination and amount roles.
    #[must_use]
    pub fn new(
        source: Arc<dyn SourceAccount>,
        destination: Arc<dyn DestinationAccount>,
        amount: i64,
    ) -> Self {
        Self {
            source: Role::bind("source", source),
            destination: Role::bind("destination", destination),
            amount,
        }
    }

    /// Returns the transferred amount.
    #[must_use]
    pub fn amount(&self) -> i64 {
        self.amount
    }

    /// Runs the transfer with this context as the current context.
    pub fn run(self: &Arc<Self>, engine: &Engine) -> Result<(), AccountError> {
        engine.run(self, |ctx| ctx.source.transfer(engine))
    }
}

impl Executable for MoneyTransfer {
    type Output = ();
    type Error = AccountError;

    fn execute(&self, engine: &Engine) -> Result<(), AccountError> {
        self.source.transfer(engine)
    }
}

/// Transfer behavior played by the source role.
pub trait TransferSource {
    /// Moves the context's amount from the source to the destination.
    fn transfer(&self, engine: &Engine) -> Result<(), AccountError>;
}

impl TransferSource for Role<dyn SourceAccount> {
    fn transfer(&self, engine: &Engine) -> Result<(), AccountError> {
        let ctx = engine.current_bound::<MoneyTransfer, _, _>(self, |c| &c.source)?;

        ctx.destination.deposit(ctx.amount);
        ctx.source.withdraw(ctx.amount);

        debug!(amount = ctx.amount, "Money transferred");
        Ok(())
    }
}

/// Someone owed money, and the account payments go to.
#[derive(Clone)]
pub struct Creditor {
    /// Creditor name.
    pub name: String,
    /// Amount to pay.
    pub amount_owed: i64,
    /// Account receiving the payment.
    pub account: Arc<dyn DestinationAccount>,
}

impl Creditor {
    /// Creates a creditor.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        amount_owed: i64,
        account: Arc<dyn DestinationAccount>,
    ) -> Self {
        Self {
            name: name.into(),
            amount_owed,
            account,
        }
    }
}

impl std::fmt::Debug for Creditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Creditor")
            .field("name", &self.name)
            .field("amount_owed", &self.amount_owed)
            .finish_non_exhaustive()
    }
}

/// Pays every creditor from one account, or nobody at all.
#[derive(Debug)]
pub struct PayBills {
    source: Role<Account>,
    creditors: Vec<Creditor>,
}

impl PayBills {
    /// Binds the paying account and the creditors.
    #[must_use]
    pub fn new(source: Arc<Account>, creditors: Vec<Creditor>) -> Self {
        Self {
            source: Role::bind("source", source),
            creditors,
        }
    }

    /// Runs the payment with this context as the current context.
    pub fn run(self: &Arc<Self>, engine: &Engine) -> Result<(), AccountError> {
        engine.run(self, |ctx| ctx.source.pay_bills(engine))
    }
}

impl Executable for PayBills {
    type Output = ();
    type Error = AccountError;

    fn execute(&self, engine: &Engine) -> Result<(), AccountError> {
        self.source.pay_bills(engine)
    }
}

/// Bill payment behavior played by the paying account.
pub trait BillPayer {
    /// Pays each creditor through a nested [`MoneyTransfer`].
    fn pay_bills(&self, engine: &Engine) -> Result<(), AccountError>;
}

impl BillPayer for Role<Account> {
    fn pay_bills(&self, engine: &Engine) -> Result<(), AccountError> {
        let ctx = engine.current_bound::<PayBills, _, _>(self, |c| &c.source)?;

        let owed: i64 = ctx.creditors.iter().map(|c| c.amount_owed).sum();
        let surplus = self.balance() - owed;
        if surplus < 0 {
            return Err(AccountError::InsufficientFunds {
                shortfall: -surplus,
            });
        }

        let source: Arc<dyn SourceAccount> = self.player().clone();
        for creditor in &ctx.creditors {
            let transfer = MoneyTransfer::new(
                Arc::clone(&source),
                Arc::clone(&creditor.account),
                creditor.amount_owed,
            );
            engine.run_opaque_void::<AccountError>(context_ref(Arc::new(transfer)))?;
            info!(creditor = %creditor.name, amount = creditor.amount_owed, "Bill paid");
        }
        Ok(())
    }
}
