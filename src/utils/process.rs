use std::io::{self, Read};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use log::{debug, warn};

/// 等待轉換器結束的上限
pub const CONVERTER_TIMEOUT: Duration = Duration::from_secs(10);

const POLL_INTERVAL: Duration = Duration::from_millis(50);
const READ_GRACE: Duration = Duration::from_millis(100);

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

#[derive(Debug)]
pub struct ProcessOutput {
    /// None 表示逾時後被強制終止
    pub status: Option<ExitStatus>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    /// 標準輸出接上 `Error: ` 前綴與標準錯誤，中間不加任何分隔
    pub fn console(&self) -> String {
        format!("{}Error: {}", self.stdout, self.stderr)
    }

    pub fn timed_out(&self) -> bool {
        self.status.is_none()
    }

    pub fn success(&self) -> bool {
        self.status.map_or(false, |s| s.success())
    }
}

/// 直接啟動轉換器（不經過 shell），擷取標準輸出與標準錯誤
///
/// 等待子行程與收集輸出共用同一個期限 `timeout`。子行程留下的背景行程若仍佔用管線，
/// 期限一到便不再等待，只回傳已讀到的輸出。
pub fn run_converter(
    program: &str,
    args: &[String],
    working_dir: &Path,
    timeout: Duration,
) -> io::Result<ProcessOutput> {
    let mut command = Command::new(program);
    command
        .args(args)
        .current_dir(working_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;
        command.creation_flags(CREATE_NO_WINDOW);
    }

    let deadline = Instant::now() + timeout;
    let mut child = command.spawn().map_err(|e| {
        warn!("無法啟動轉換器 {}：{}", program, e);
        e
    })?;
    debug!("轉換器已啟動，PID：{}", child.id());

    // 兩個讀取執行緒同時清空管線，避免輸出過多時子行程阻塞
    let stdout_reader = PipeReader::spawn(child.stdout.take());
    let stderr_reader = PipeReader::spawn(child.stderr.take());

    let status = wait_until(&mut child, deadline)?;
    if status.is_none() {
        warn!("轉換器超過 {} 秒未結束，強制終止", timeout.as_secs());
        if let Err(e) = child.kill() {
            debug!("終止轉換器失敗（可能已結束）：{}", e);
        }
        child.wait()?;
    }

    // 給讀取執行緒一點時間取走終止前寫入的資料
    let read_deadline = deadline.max(Instant::now() + READ_GRACE);
    Ok(ProcessOutput {
        status,
        stdout: stdout_reader.collect(read_deadline)?,
        stderr: stderr_reader.collect(read_deadline)?,
    })
}

fn wait_until(child: &mut Child, deadline: Instant) -> io::Result<Option<ExitStatus>> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

// 讀取執行緒把資料累積在共享緩衝區，讀到 EOF 或發生錯誤時透過通道回報
struct PipeReader {
    buffer: Arc<Mutex<Vec<u8>>>,
    done: Receiver<io::Result<()>>,
}

impl PipeReader {
    fn spawn<R: Read + Send + 'static>(pipe: Option<R>) -> Self {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let (tx, done) = mpsc::channel();
        let sink = Arc::clone(&buffer);
        thread::spawn(move || {
            let result = match pipe {
                Some(pipe) => drain(pipe, &sink),
                None => Ok(()),
            };
            // 接收端可能已放棄等待
            let _ = tx.send(result);
        });
        PipeReader { buffer, done }
    }

    fn collect(self, deadline: Instant) -> io::Result<String> {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match self.done.recv_timeout(remaining) {
            Ok(result) => result?,
            Err(RecvTimeoutError::Timeout) => {
                warn!("轉換器的輸出管線仍被其他行程佔用，放棄等待剩餘輸出");
            }
            Err(RecvTimeoutError::Disconnected) => {
                return Err(io::Error::new(io::ErrorKind::Other, "讀取轉換器輸出的執行緒異常結束"));
            }
        }
        let buffer = self.buffer.lock().unwrap_or_else(|e| e.into_inner());
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

fn drain<R: Read>(mut pipe: R, sink: &Mutex<Vec<u8>>) -> io::Result<()> {
    let mut chunk = [0u8; 8192];
    loop {
        match pipe.read(&mut chunk) {
            Ok(0) => return Ok(()),
            Ok(n) => sink
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .extend_from_slice(&chunk[..n]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}
