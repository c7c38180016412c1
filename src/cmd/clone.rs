use std::io::Write;

use crate::{
    cli::Cli,
    git::Cloner,
    types::{CloneError, CloneRequest, CloneResult},
};

pub fn clone_repository<C, W>(
    request: &CloneRequest,
    cloner: &C,
    out: &mut W,
) -> Result<CloneResult, CloneError>
where
    C: Cloner + ?Sized,
    W: Write,
{
    writeln!(out, "Cloning repository: {}", request.repo_name)?;
    writeln!(out, "URL: {}", request.url)?;
    writeln!(out, "Directory: {}", request.directory.display())?;
    writeln!(out, "Repository Name: {}", request.repo_name)?;
    writeln!(out, "Cloning by {}", request.reference)?;
    out.flush()?;

    log::debug!("Depth: {}", request.depth);

    let result = cloner.clone_single_ref(request)?;

    writeln!(out, "Commit: {}", result.commit_id)?;
    Ok(result)
}

pub fn run<C, W>(args: &Cli, cloner: &C, out: &mut W) -> Result<CloneResult, CloneError>
where
    C: Cloner + ?Sized,
    W: Write,
{
    let request = CloneRequest::try_from(args)?;
    log::debug!("{:?}", &request);
    clone_repository(&request, cloner, out)
}
