//! Remote filesystem and installer calls.
//!
//! Storage cards on Windows Mobile are root directories carrying the
//! DIRECTORY and TEMPORARY attributes, so the inventory walks `\*` and
//! keeps entries flagged that way. Installation copies the package into
//! the chosen location and hands it to `wceload.exe` on the device.

use crate::models::{InstallRequest, StorageEntry};
use crate::phone::error::PhoneError;
use crate::phone::rapi::wire::{Frame, Reply};
use crate::phone::rapi::RapiSession;
use tokio::fs;
use tokio::io::AsyncReadExt;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Command codes for the calls this module issues.
mod command {
    pub const FIND_FIRST_FILE: u32 = 0x00;
    pub const FIND_NEXT_FILE: u32 = 0x01;
    pub const FIND_CLOSE: u32 = 0x02;
    pub const CREATE_FILE: u32 = 0x05;
    pub const WRITE_FILE: u32 = 0x07;
    pub const CLOSE_HANDLE: u32 = 0x08;
    pub const CREATE_PROCESS: u32 = 0x19;
    pub const GET_STORE_INFORMATION: u32 = 0x29;
    pub const GET_DISK_FREE_SPACE_EX: u32 = 0x46;
}

const GENERIC_WRITE: u32 = 0x4000_0000;
const CREATE_ALWAYS: u32 = 2;
const FILE_ATTRIBUTE_NORMAL: u32 = 0x80;
const FILE_ATTRIBUTE_DIRECTORY: u32 = 0x10;
const FILE_ATTRIBUTE_TEMPORARY: u32 = 0x100;
const INVALID_HANDLE: u32 = 0xFFFF_FFFF;

const MAIN_MEMORY: &str = "Main Memory";
const WCELOAD: &str = r"\Windows\wceload.exe";
const COPY_CHUNK: usize = 16 * 1024;

/// Lists main memory followed by every mounted storage card.
pub async fn storage_inventory(session: &mut RapiSession) -> Result<Vec<StorageEntry>, PhoneError> {
    let mut reply = session
        .invoke(Frame::new(command::GET_STORE_INFORMATION))
        .await?;
    let total = reply.take_u32()? as u64;
    let free = reply.take_u32()? as u64;

    let mut entries = vec![StorageEntry {
        name: MAIN_MEMORY.to_string(),
        location: r"\".to_string(),
        free_bytes: free,
        total_bytes: total,
    }];

    for name in storage_card_names(session).await? {
        let (free_bytes, total_bytes) = disk_free_space(session, &format!(r"\{name}\")).await?;
        entries.push(StorageEntry {
            location: format!(r"\{name}"),
            name,
            free_bytes,
            total_bytes,
        });
    }

    info!("device reports {} storage locations", entries.len());
    Ok(entries)
}

async fn storage_card_names(session: &mut RapiSession) -> Result<Vec<String>, PhoneError> {
    let mut frame = Frame::new(command::FIND_FIRST_FILE);
    frame.put_string(r"\*");
    let mut reply = session.invoke(frame).await?;

    let handle = reply.take_u32()?;
    if handle == INVALID_HANDLE {
        return Ok(Vec::new());
    }

    const CARD_ATTRIBUTES: u32 = FILE_ATTRIBUTE_DIRECTORY | FILE_ATTRIBUTE_TEMPORARY;
    let mut names = Vec::new();
    let mut entry = read_find_data(&mut reply)?;
    loop {
        if entry.attributes & CARD_ATTRIBUTES == CARD_ATTRIBUTES {
            debug!("found storage card {}", entry.name);
            names.push(entry.name);
        }

        let mut frame = Frame::new(command::FIND_NEXT_FILE);
        frame.put_u32(handle);
        let mut reply = session.invoke(frame).await?;
        if !reply.take_bool()? {
            break;
        }
        entry = read_find_data(&mut reply)?;
    }

    let mut frame = Frame::new(command::FIND_CLOSE);
    frame.put_u32(handle);
    session.invoke(frame).await?;

    Ok(names)
}

async fn disk_free_space(
    session: &mut RapiSession,
    path: &str,
) -> Result<(u64, u64), PhoneError> {
    let mut frame = Frame::new(command::GET_DISK_FREE_SPACE_EX);
    frame.put_string(path);
    let mut reply = session.invoke(frame).await?;

    let free_available = reply.take_u64()?;
    let total = reply.take_u64()?;
    let _total_free = reply.take_u64()?;
    Ok((free_available, total))
}

struct FindData {
    attributes: u32,
    name: String,
}

fn read_find_data(reply: &mut Reply) -> Result<FindData, PhoneError> {
    let attributes = reply.take_u32()?;
    // three FILETIMEs, the split 64-bit size and the object id
    reply.skip(3 * 8 + 3 * 4)?;
    let name = reply.take_string()?;
    Ok(FindData { attributes, name })
}

/// Copies the package onto the device, launches the installer and
/// optionally removes the local file. Progress is reported as integer
/// percentages of the copied bytes.
pub async fn install_cab(
    session: &mut RapiSession,
    request: &InstallRequest,
    progress: &mpsc::UnboundedSender<u32>,
) -> Result<(), PhoneError> {
    let file_name = request
        .cab_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| {
            PhoneError::Install(format!("{} is not a file", request.cab_path.display()))
        })?;

    let mut local = fs::File::open(&request.cab_path).await.map_err(|e| {
        PhoneError::Install(format!("cannot open {}: {e}", request.cab_path.display()))
    })?;
    let total_bytes = local
        .metadata()
        .await
        .map_err(|e| {
            PhoneError::Install(format!("cannot read {}: {e}", request.cab_path.display()))
        })?
        .len();

    let destination = device_path_join(&request.location, &file_name);
    info!(
        "copying {} ({total_bytes} bytes) to {destination}",
        request.cab_path.display()
    );

    let handle = create_file(session, &destination).await?;
    let copied = copy_stream(session, handle, &mut local, total_bytes, progress).await;
    let closed = close_handle(session, handle).await;
    copied?;
    closed?;

    info!("launching installer for {destination}");
    create_process(session, WCELOAD, &format!("\"{destination}\"")).await?;

    if request.delete_after {
        debug!("removing local copy {}", request.cab_path.display());
        fs::remove_file(&request.cab_path).await.map_err(|e| {
            PhoneError::Install(format!(
                "package installed, but removing {} failed: {e}",
                request.cab_path.display()
            ))
        })?;
    }

    Ok(())
}

async fn copy_stream(
    session: &mut RapiSession,
    handle: u32,
    local: &mut fs::File,
    total_bytes: u64,
    progress: &mpsc::UnboundedSender<u32>,
) -> Result<(), PhoneError> {
    let mut buffer = vec![0u8; COPY_CHUNK];
    let mut written: u64 = 0;
    let mut last_percent = 0;
    let _ = progress.send(0);

    loop {
        let n = local
            .read(&mut buffer)
            .await
            .map_err(|e| PhoneError::Install(format!("reading package failed: {e}")))?;
        if n == 0 {
            break;
        }
        write_file(session, handle, &buffer[..n]).await?;
        written += n as u64;

        let percent = if total_bytes == 0 {
            100
        } else {
            ((written * 100 / total_bytes) as u32).min(100)
        };
        if percent != last_percent {
            let _ = progress.send(percent);
            last_percent = percent;
        }
    }

    if last_percent != 100 {
        let _ = progress.send(100);
    }
    Ok(())
}

async fn create_file(session: &mut RapiSession, path: &str) -> Result<u32, PhoneError> {
    let mut frame = Frame::new(command::CREATE_FILE);
    frame.put_string(path);
    frame.put_u32(GENERIC_WRITE);
    frame.put_u32(0); // no sharing
    frame.put_u32(CREATE_ALWAYS);
    frame.put_u32(FILE_ATTRIBUTE_NORMAL);
    let mut reply = session.invoke(frame).await?;

    let handle = reply.take_u32()?;
    if handle == INVALID_HANDLE {
        return Err(PhoneError::Install(format!(
            "device refused to create {path}"
        )));
    }
    Ok(handle)
}

async fn write_file(
    session: &mut RapiSession,
    handle: u32,
    data: &[u8],
) -> Result<(), PhoneError> {
    let mut frame = Frame::new(command::WRITE_FILE);
    frame.put_u32(handle);
    frame.put_data(data);
    let mut reply = session.invoke(frame).await?;

    let written = reply.take_u32()?;
    if written as usize != data.len() {
        return Err(PhoneError::Install(format!(
            "device wrote {written} of {} bytes",
            data.len()
        )));
    }
    Ok(())
}

async fn close_handle(session: &mut RapiSession, handle: u32) -> Result<(), PhoneError> {
    let mut frame = Frame::new(command::CLOSE_HANDLE);
    frame.put_u32(handle);
    session.invoke(frame).await?;
    Ok(())
}

async fn create_process(
    session: &mut RapiSession,
    application: &str,
    command_line: &str,
) -> Result<(), PhoneError> {
    let mut frame = Frame::new(command::CREATE_PROCESS);
    frame.put_opt_string(Some(application));
    frame.put_opt_string(Some(command_line));
    frame.put_u32(0); // creation flags
    let mut reply = session.invoke(frame).await?;

    let pid = reply.take_u32()?;
    debug!("installer running as process {pid:#x}");
    Ok(())
}

fn device_path_join(location: &str, name: &str) -> String {
    if location.ends_with('\\') {
        format!("{location}{name}")
    } else {
        format!("{location}\\{name}")
    }
}
