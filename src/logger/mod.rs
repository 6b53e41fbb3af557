use log::LevelFilter;
use simple_logger::SimpleLogger;

/// 根据 verbose 选择日志级别
pub fn level_for(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    }
}

/// 安装全局日志，重复调用时忽略
pub fn init_logger(verbose: bool) {
    let _ = SimpleLogger::new()
        .with_level(LevelFilter::Warn)
        .with_module_level("sublive", level_for(verbose))
        .init();
}
