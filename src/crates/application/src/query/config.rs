/// 排行、随机等读视图的默认参数
pub trait ViewConfig: Send + Sync {
    /// 排行榜默认返回的歌曲数
    fn default_top_size(&self) -> usize;

    /// 随机推荐默认返回的歌曲数
    fn default_sample_size(&self) -> usize;

    /// 随机数种子，设置后随机推荐的结果可复现
    fn sample_seed(&self) -> Option<u64> {
        None
    }
}
