use super::{Session, print_summary};

pub(crate) fn run(session: &Session) -> Result<(), String> {
    print_summary(session)
}
