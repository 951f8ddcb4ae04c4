use thiserror::Error;

use usagi_db::RepositoryError;

#[derive(Debug, Error)]
pub enum EconomyError {
    #[error("stakes start at {minimum} coins")]
    MinimumBet { minimum: i64 },
    #[error("amount must be positive")]
    InvalidAmount,
    #[error("balance {balance} cannot cover {required} coins")]
    InsufficientBalance { balance: i64, required: i64 },
    #[error("no shop item with id {item_id}")]
    ItemNotFound { item_id: u32 },
    #[error("already checked in today")]
    AlreadyCheckedIn,
    #[error("today's jackpot already went to {winner}")]
    JackpotAlreadyWon { winner: String },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl EconomyError {
    /// User errors become plain replies and change no state. Repository
    /// failures are the only operational ones.
    pub fn is_user_error(&self) -> bool {
        !matches!(self, Self::Repository(_))
    }
}

#[cfg(test)]
mod tests {
    use usagi_db::RepositoryError;

    use super::EconomyError;

    #[test]
    fn only_repository_failures_are_operational() {
        assert!(EconomyError::AlreadyCheckedIn.is_user_error());
        assert!(EconomyError::MinimumBet { minimum: 10 }.is_user_error());
        assert!(EconomyError::InsufficientBalance { balance: 5, required: 10 }.is_user_error());

        let failure = EconomyError::Repository(RepositoryError::Decode("boom".to_string()));
        assert!(!failure.is_user_error());
    }
}
