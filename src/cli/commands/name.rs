//! Name command - print the claim name for a job

use crate::cli::args::NameArgs;
use crate::error::JobPvcResult;
use crate::naming::normalize_job_name;

/// Execute the name command
pub fn execute(args: NameArgs) -> JobPvcResult<()> {
    println!("{}", normalize_job_name(&args.job)?);
    Ok(())
}
