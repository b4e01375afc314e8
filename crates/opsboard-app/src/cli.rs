//! 명령행 인자 정의 (clap derive)

use clap::{Args, Parser, Subcommand, ValueEnum};
use opsboard_analysis::filter::HostView;
use opsboard_core::models::event::{EventStatus, Priority, Severity};
use std::path::PathBuf;

/// OPSBOARD 터미널 클라이언트
///
/// IT 운영 백엔드의 자산, 이벤트, 서버 모니터링 현황을 조회하고 이벤트를 관리한다.
#[derive(Parser, Debug)]
#[command(name = "opsboard")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// 백엔드 URL (설정 파일 값을 덮어씀, 예: http://localhost:5000)
    #[arg(long, short = 's', global = true)]
    pub server: Option<String>,

    /// 설정 파일 경로 (기본: 플랫폼별 설정 디렉토리의 config.json)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, short = 'l', global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// 자산 목록
    Assets(AssetArgs),
    /// 이벤트 목록
    Events(EventListArgs),
    /// 이벤트 생성/변경/삭제/상세
    #[command(subcommand)]
    Event(EventCommand),
    /// 모니터링 대시보드
    Dashboard(DashboardArgs),
    /// 외부 연동 설정
    #[command(subcommand)]
    Settings(SettingsCommand),
}

#[derive(Args, Debug, Default)]
pub struct AssetArgs {
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long)]
    pub brand: Option<String>,
    #[arg(long = "type")]
    pub asset_type: Option<String>,
    /// id/이름/모델/시리얼/담당자/위치 부분 문자열 검색
    #[arg(long)]
    pub search: Option<String>,
}

#[derive(Args, Debug, Default)]
pub struct EventListArgs {
    #[arg(long)]
    pub status: Option<EventStatus>,
    #[arg(long)]
    pub severity: Option<Severity>,
    #[arg(long)]
    pub priority: Option<Priority>,
    /// 번호/제목/설명/출처 부분 문자열 검색
    #[arg(long)]
    pub search: Option<String>,
    /// 쿼리 파라미터 형식 필터 (예: "status=unresolved&severity=high")
    #[arg(long)]
    pub query: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum EventCommand {
    /// 이벤트 생성
    Create(CreateEventArgs),
    /// 상태 변경
    Status {
        id: String,
        #[arg(value_parser = parse_settable_status)]
        status: EventStatus,
    },
    /// 노트 추가
    Note { id: String, text: String },
    /// 이벤트 삭제
    Delete { id: String },
    /// 이벤트 상세
    Show { id: String },
}

#[derive(Args, Debug)]
pub struct CreateEventArgs {
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub description: String,
    #[arg(long)]
    pub source: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub severity: Option<Severity>,
    #[arg(long)]
    pub priority: Option<Priority>,
    #[arg(long)]
    pub assigned_to: Option<String>,
}

#[derive(Args, Debug, Default)]
pub struct DashboardArgs {
    /// 푸시 채널을 따라가며 계속 갱신
    #[arg(long, short = 'w')]
    pub watch: bool,
    /// 호스트 카드 보기 필터
    #[arg(long, value_enum, default_value_t = ViewFilter::All)]
    pub view: ViewFilter,
    /// 호스트 이름 검색
    #[arg(long)]
    pub search: Option<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewFilter {
    #[default]
    All,
    /// 카드 경고가 있는 호스트만
    Alerts,
    /// 카드 경고가 없는 호스트만
    Healthy,
}

impl From<ViewFilter> for HostView {
    fn from(view: ViewFilter) -> Self {
        match view {
            ViewFilter::All => HostView::All,
            ViewFilter::Alerts => HostView::AlertOnly,
            ViewFilter::Healthy => HostView::HealthyOnly,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    /// Grafana 연동 설정
    #[command(subcommand)]
    Grafana(GrafanaCommand),
}

#[derive(Subcommand, Debug)]
pub enum GrafanaCommand {
    /// 저장된 설정 조회
    Show,
    /// 설정 저장
    Save {
        #[arg(long)]
        url: String,
        #[arg(long)]
        api_key: String,
    },
    /// 설정 초기화
    Reset,
    /// 연결 테스트 (인자가 없으면 저장된 설정 사용)
    Test {
        #[arg(long, requires = "api_key")]
        url: Option<String>,
        #[arg(long, requires = "url")]
        api_key: Option<String>,
    },
}

/// 상태 변경 컨트롤에서 고를 수 있는 값만 허용 (`closed` 제외)
fn parse_settable_status(s: &str) -> Result<EventStatus, String> {
    let status: EventStatus = s.parse().map_err(|e| format!("{e}"))?;
    if !status.is_settable() {
        let allowed: Vec<_> = EventStatus::SETTABLE.iter().map(|s| s.as_str()).collect();
        return Err(format!("허용 값: {}", allowed.join(", ")));
    }
    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_event_list_filters() {
        let cli = Cli::try_parse_from([
            "opsboard",
            "--server",
            "http://ops:5000",
            "events",
            "--severity",
            "critical",
            "--query",
            "status=unresolved",
        ])
        .unwrap();
        assert_eq!(cli.server.as_deref(), Some("http://ops:5000"));
        match cli.command {
            Command::Events(args) => {
                assert_eq!(args.severity, Some(Severity::Critical));
                assert_eq!(args.query.as_deref(), Some("status=unresolved"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn status_command_rejects_closed() {
        let result = Cli::try_parse_from(["opsboard", "event", "status", "EVT1", "closed"]);
        assert!(result.is_err());

        let cli = Cli::try_parse_from(["opsboard", "event", "status", "EVT1", "in-progress"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Command::Event(EventCommand::Status {
                status: EventStatus::InProgress,
                ..
            })
        ));
    }

    #[test]
    fn unknown_severity_is_rejected() {
        let result = Cli::try_parse_from(["opsboard", "events", "--severity", "apocalyptic"]);
        assert!(result.is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["opsboard", "dashboard", "--view", "alerts", "-l", "debug"])
            .unwrap();
        assert_eq!(cli.log_level, "debug");
        assert!(matches!(
            cli.command,
            Command::Dashboard(DashboardArgs {
                view: ViewFilter::Alerts,
                ..
            })
        ));
    }
}
