//! Explorer HTML page

pub(crate) const INDEX_HTML: &str = r#"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<title>Feedback Explorer</title>
<style>
  body { font-family: system-ui, sans-serif; margin: 0; display: flex; min-height: 100vh; }
  aside { width: 320px; padding: 16px; background: #f4f5f7; box-sizing: border-box; }
  main { flex: 1; padding: 16px; overflow-x: auto; }
  label { display: block; margin-top: 10px; font-size: 14px; }
  textarea, input[type=text] { width: 100%; box-sizing: border-box; }
  input[type=range] { width: 100%; }
  button { margin-top: 16px; width: 100%; padding: 8px; }
  pre { background: #1e1e1e; color: #ddd; padding: 12px; overflow-x: auto; }
  table { border-collapse: collapse; font-size: 13px; }
  th, td { border: 1px solid #ccc; padding: 4px 6px; text-align: left; vertical-align: top; }
  .note { color: #555; }
  .error { color: #b00020; }
</style>
</head>
<body>
<aside>
  <h3>Search Parameters</h3>
  <label>Vector search query
    <textarea id="query" rows="4" placeholder="e.g. The customer was unhappy with cleanliness"></textarea>
  </label>
  <label>Text contains <input id="contains" type="text"></label>
  <h4>Rating filters (max)</h4>
  <div class="note">Only feedback rated at or below the value. Drag to 5 to disable.</div>
  <div id="ratings"></div>
  <h4>Vector distance</h4>
  <label><input id="use-distance" type="checkbox" checked> Max cosine distance <span id="distance-value">0.5</span>
    <input id="distance" type="range" min="0" max="1" step="0.05" value="0.5">
  </label>
  <label>Top N results <span id="top-value">20</span>
    <input id="top" type="range" min="1" max="100" value="20">
  </label>
  <button id="run">Run Query</button>
</aside>
<main>
  <h2>Feedback Explorer</h2>
  <div id="status" class="note">Enter a search query and click <b>Run Query</b>.</div>
  <div id="sql"></div>
  <div id="results"></div>
</main>
<script>
  const RATINGS = [
    ["quality_of_work", "Quality of Work"],
    ["timeliness", "Timeliness"],
    ["politeness", "Politeness"],
    ["cleanliness", "Cleanliness"],
    ["overall_experience", "Overall Experience"],
  ];
  const ratings = document.getElementById("ratings");
  for (const [key, label] of RATINGS) {
    ratings.insertAdjacentHTML("beforeend",
      `<label>${label} <span id="${key}-value">5</span>
       <input id="${key}" type="range" min="1" max="5" value="5"></label>`);
  }
  for (const input of document.querySelectorAll("input[type=range]")) {
    input.addEventListener("input", () => {
      document.getElementById(input.id + "-value").textContent = input.value;
    });
  }

  function escapeHtml(text) {
    const div = document.createElement("div");
    div.textContent = text == null ? "" : String(text);
    return div.innerHTML;
  }

  document.getElementById("run").addEventListener("click", async () => {
    const status = document.getElementById("status");
    const queryText = document.getElementById("query").value.trim();
    if (!queryText) {
      status.innerHTML = '<span class="error">Please enter a query text for vector search.</span>';
      return;
    }
    const body = {
      query_text: queryText,
      ratings: {},
      top_n: Number(document.getElementById("top").value),
      contains: document.getElementById("contains").value || null,
      distance_threshold: document.getElementById("use-distance").checked
        ? Number(document.getElementById("distance").value) : null,
    };
    for (const [key] of RATINGS) {
      const value = Number(document.getElementById(key).value);
      if (value < 5) body.ratings[key] = value;
    }

    status.textContent = "Searching...";
    const resp = await fetch("/api/search", {
      method: "POST",
      headers: { "Content-Type": "application/json" },
      body: JSON.stringify(body),
    });
    const data = await resp.json().catch(() => ({ error: resp.statusText }));
    if (!resp.ok) {
      status.innerHTML = `<span class="error">${escapeHtml(data.error)}</span>`;
      return;
    }

    document.getElementById("sql").innerHTML = `<h3>Generated SQL</h3><pre>${escapeHtml(data.sql)}</pre>`;
    status.textContent = `Results (${data.count} rows)`;
    if (data.count === 0) {
      document.getElementById("results").innerHTML =
        '<div class="note">No matching feedback found. Try adjusting your filters or increasing the distance threshold.</div>';
      return;
    }
    const head = data.columns.map(c => `<th>${escapeHtml(c)}</th>`).join("");
    const rows = data.rows.map(r => "<tr>" + r.map(v => `<td>${escapeHtml(v)}</td>`).join("") + "</tr>").join("");
    document.getElementById("results").innerHTML = `<table><thead><tr>${head}</tr></thead><tbody>${rows}</tbody></table>`;
  });
</script>
</body>
</html>
"#;
