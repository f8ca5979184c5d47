use super::{Session, print_summary};

pub(crate) fn run(session: &mut Session) -> Result<(), String> {
    session.clear();

    print_summary(session)
}
